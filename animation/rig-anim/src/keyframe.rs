//! Keyframe tracks and interpolation
//!
//! A [`KeyframeTrack`] holds one bone's animation for one clip as three
//! independent sequences (position, rotation, scale). Sampling scans for the
//! segment that brackets the query time and blends its two keys: vectors
//! linearly, rotations along the shortest spherical arc. Times past the
//! last key hold the last value; wrapping is the caller's business.

use glam::{Mat4, Quat, Vec3};

use crate::error::{AnimError, Result};

/// Trait for values that can be blended between two keys
pub trait Lerp: Copy {
    /// Blend from `self` towards `other` by `t` in `[0, 1]`
    fn lerp_to(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp_to(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp_to(&self, other: &Self, t: f32) -> Self {
        self.lerp(*other, t)
    }
}

impl Lerp for Quat {
    fn lerp_to(&self, other: &Self, t: f32) -> Self {
        // q and -q are the same rotation; pick the one on our hemisphere
        let end = if self.dot(*other) < 0.0 { -*other } else { *other };
        self.slerp(end, t).normalize()
    }
}

/// A single sample: time in ticks and the value at that time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub time: f64,
    pub value: T,
}

impl<T> Keyframe<T> {
    /// Create a keyframe
    pub const fn new(time: f64, value: T) -> Self {
        Self { time, value }
    }
}

/// Position or scale key
pub type VectorKey = Keyframe<Vec3>;

/// Rotation key
pub type QuatKey = Keyframe<Quat>;

/// Sample a sorted key sequence at `time`, writing into `out`.
///
/// An empty sequence leaves `out` untouched. The first segment whose end
/// lies after `time` is blended; before the first key the first value is
/// held and past the last key the last value is held.
pub fn interpolate_key<T: Lerp>(keys: &[Keyframe<T>], time: f64, out: &mut T) {
    let Some(last) = keys.last() else {
        return;
    };

    for pair in keys.windows(2) {
        let (start, end) = (&pair[0], &pair[1]);
        if time < end.time {
            let span = end.time - start.time;
            let factor = if span > 0.0 {
                ((time - start.time) / span).clamp(0.0, 1.0) as f32
            } else {
                0.0
            };
            *out = start.value.lerp_to(&end.value, factor);
            return;
        }
    }

    *out = last.value;
}

/// One bone's keys for one clip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyframeTrack {
    pub positions: Vec<VectorKey>,
    pub rotations: Vec<QuatKey>,
    pub scalings: Vec<VectorKey>,
}

impl KeyframeTrack {
    /// Create an empty track (bone not animated in this clip)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set position keys
    pub fn with_positions(mut self, positions: Vec<VectorKey>) -> Self {
        self.positions = positions;
        self
    }

    /// Builder: set rotation keys
    pub fn with_rotations(mut self, rotations: Vec<QuatKey>) -> Self {
        self.rotations = rotations;
        self
    }

    /// Builder: set scale keys
    pub fn with_scalings(mut self, scalings: Vec<VectorKey>) -> Self {
        self.scalings = scalings;
        self
    }

    /// True when no channel carries a key
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.rotations.is_empty() && self.scalings.is_empty()
    }

    /// Latest key time across all channels
    pub fn end_time(&self) -> f64 {
        let last = |times: Option<f64>| times.unwrap_or(0.0);
        last(self.positions.last().map(|k| k.time))
            .max(last(self.rotations.last().map(|k| k.time)))
            .max(last(self.scalings.last().map(|k| k.time)))
    }

    /// Check that times never decrease within a channel
    pub fn validate(&self, bone: &str, clip: usize) -> Result<()> {
        fn sorted<T>(keys: &[Keyframe<T>]) -> bool {
            keys.windows(2).all(|pair| pair[0].time <= pair[1].time)
        }

        let unsorted = |channel| AnimError::UnsortedKeyframes {
            bone: bone.to_string(),
            clip,
            channel,
        };
        if !sorted(&self.positions) {
            return Err(unsorted("position"));
        }
        if !sorted(&self.rotations) {
            return Err(unsorted("rotation"));
        }
        if !sorted(&self.scalings) {
            return Err(unsorted("scale"));
        }
        Ok(())
    }

    /// Local transform at `time`: `translate * rotate * scale`.
    ///
    /// Channels without keys keep the matching component of `rest`.
    /// Returns `None` for an empty track so the caller keeps its rest pose.
    pub fn sample(&self, time: f64, rest: &Mat4) -> Option<Mat4> {
        if self.is_empty() {
            return None;
        }

        let (mut scale, mut rotation, mut translation) = rest.to_scale_rotation_translation();
        interpolate_key(&self.positions, time, &mut translation);
        interpolate_key(&self.rotations, time, &mut rotation);
        interpolate_key(&self.scalings, time, &mut scale);

        Some(
            Mat4::from_translation(translation)
                * Mat4::from_quat(rotation)
                * Mat4::from_scale(scale),
        )
    }
}
