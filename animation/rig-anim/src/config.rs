//! Options controlling clip timing, palette allocation and keyframe validation

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tick rate substituted when a clip declares zero or no ticks per second
pub const DEFAULT_TICKS_PER_SECOND: f64 = 25.0;

/// How skinning palette ranges are handed out to instances of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PaletteMode {
    /// Every instance of a model writes into the model's single range.
    /// Two instances playing different clips overwrite each other's bones
    /// within a frame; the last one evaluated wins.
    #[default]
    SharedPerModel,
    /// Each attached instance receives its own range, so instances can
    /// hold independent poses in the same frame.
    PerInstance,
}

/// Options for the animation subsystem
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnimationOptions {
    /// Ticks per second used for clips whose source rate is zero or unset
    pub default_ticks_per_second: f64,
    /// Palette allocation policy for instances
    pub palette_mode: PaletteMode,
    /// Reject keyframe sequences whose times decrease
    pub validate_keyframes: bool,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            default_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            palette_mode: PaletteMode::default(),
            validate_keyframes: true,
        }
    }
}

impl AnimationOptions {
    /// Options with per-instance palette ranges
    pub fn per_instance() -> Self {
        Self {
            palette_mode: PaletteMode::PerInstance,
            ..Self::default()
        }
    }
}
