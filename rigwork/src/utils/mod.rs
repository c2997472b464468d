//! Shared utilities for the rigwork CLI

pub mod table;
pub mod tree;

pub use table::*;
pub use tree::*;
