//! Persistable playback state of one instance

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::playback::PlaybackState;

/// The scalars a world save stores for an animated instance.
///
/// Restoring a snapshot takes these values as they are; only the playback
/// origin is re-anchored on the current clock.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlaybackSnapshot {
    /// Selected clip
    pub clip_index: usize,
    /// Playback speed multiplier
    pub speed: f64,
    /// Wall-clock seconds played so far
    pub elapsed_seconds: f64,
    /// Playback state at save time
    pub state: PlaybackState,
    /// Whether the clip was looping
    pub looped: bool,
    /// Per-mesh visibility flags
    pub mesh_visibility: Vec<bool>,
}
