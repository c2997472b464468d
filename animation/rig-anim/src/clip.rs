//! Animation clip catalog entries

/// A named animation sequence measured in ticks
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Clip name as exported by the authoring tool
    pub name: String,
    /// Length in ticks
    pub duration: f64,
    /// Tick rate used to convert wall-clock seconds into ticks
    pub ticks_per_second: f64,
}

impl AnimationClip {
    /// Create a clip, substituting `default_rate` for a zero or non-finite rate
    pub fn new(
        name: impl Into<String>,
        duration: f64,
        ticks_per_second: f64,
        default_rate: f64,
    ) -> Self {
        let name = name.into();
        let ticks_per_second = if ticks_per_second > 0.0 && ticks_per_second.is_finite() {
            ticks_per_second
        } else {
            log::debug!(
                "Clip '{}' declares {} ticks/s, using {}",
                name,
                ticks_per_second,
                default_rate
            );
            default_rate
        };

        if duration <= 0.0 {
            log::warn!("Clip '{}' has non-positive duration {}", name, duration);
        }

        Self {
            name,
            duration,
            ticks_per_second,
        }
    }

    /// Clip length in seconds at its own tick rate
    pub fn duration_seconds(&self) -> f64 {
        self.duration / self.ticks_per_second
    }

    /// Convert elapsed seconds into ticks at the given speed multiplier
    pub fn seconds_to_ticks(&self, seconds: f64, speed: f64) -> f64 {
        seconds * speed * self.ticks_per_second
    }

    /// Wrap a tick value into `[0, duration)`; zero-length clips pin to 0
    pub fn wrap_ticks(&self, ticks: f64) -> f64 {
        if self.duration > 0.0 {
            ticks.rem_euclid(self.duration)
        } else {
            0.0
        }
    }
}
