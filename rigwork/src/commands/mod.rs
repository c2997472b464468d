//! Command implementations

pub mod rig;
