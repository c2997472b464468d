//! Per-model animation data shared by every instance of a model

use glam::Mat4;
use std::collections::HashMap;

use crate::bone_tree::BoneTree;
use crate::clip::AnimationClip;
use crate::config::AnimationOptions;
use crate::error::{AnimError, Result};
use crate::keyframe::KeyframeTrack;

/// Skeleton, clips and keyframes of one imported model.
///
/// Built once at import time and then only read; instances hold it behind
/// an `Arc`.
#[derive(Debug, Clone)]
pub struct ModelAnimationData {
    name: String,
    tree: BoneTree,
    channels: HashMap<String, Vec<KeyframeTrack>>,
    clips: Vec<AnimationClip>,
    global_inverse_transform: Mat4,
    bone_count: usize,
    mesh_names: Vec<String>,
}

impl ModelAnimationData {
    /// Start building model data around a populated bone tree
    pub fn builder(name: impl Into<String>, tree: BoneTree) -> ModelAnimationDataBuilder {
        ModelAnimationDataBuilder {
            name: name.into(),
            tree,
            channels: HashMap::new(),
            clips: Vec::new(),
            global_inverse_transform: None,
            mesh_names: Vec::new(),
        }
    }

    /// Model name, also the registry key
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bone hierarchy
    pub fn tree(&self) -> &BoneTree {
        &self.tree
    }

    /// Clip catalog
    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    /// Clip at `index`
    pub fn clip(&self, index: usize) -> Result<&AnimationClip> {
        self.clips.get(index).ok_or(AnimError::IndexOutOfRange {
            what: "clip",
            index,
            len: self.clips.len(),
        })
    }

    /// Index of the clip named `name`
    pub fn clip_index(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|clip| clip.name == name)
    }

    /// Keyframes of `bone` in clip `clip`, if the bone is animated there
    pub fn track(&self, bone: &str, clip: usize) -> Option<&KeyframeTrack> {
        self.channels.get(bone).and_then(|tracks| tracks.get(clip))
    }

    /// Names of all animated bones
    pub fn animated_bones(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    /// Inverse of the root's rest global transform
    pub fn global_inverse_transform(&self) -> Mat4 {
        self.global_inverse_transform
    }

    /// Palette slots this model occupies
    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    /// Mesh names in draw order
    pub fn mesh_names(&self) -> &[String] {
        &self.mesh_names
    }

    /// Position of `name` in [`mesh_names`](Self::mesh_names)
    pub fn mesh_index(&self, name: &str) -> Option<usize> {
        self.mesh_names.iter().position(|mesh| mesh == name)
    }
}

/// Builder returned by [`ModelAnimationData::builder`]
#[derive(Debug)]
pub struct ModelAnimationDataBuilder {
    name: String,
    tree: BoneTree,
    channels: HashMap<String, Vec<KeyframeTrack>>,
    clips: Vec<(String, f64, f64)>,
    global_inverse_transform: Option<Mat4>,
    mesh_names: Vec<String>,
}

impl ModelAnimationDataBuilder {
    /// Append a clip; a zero tick rate falls back to the configured default
    pub fn clip(mut self, name: impl Into<String>, duration: f64, ticks_per_second: f64) -> Self {
        self.clips.push((name.into(), duration, ticks_per_second));
        self
    }

    /// Set the keyframe track of `bone` for clip `clip`.
    ///
    /// Clips the bone is not animated in get empty tracks.
    pub fn track(mut self, bone: impl Into<String>, clip: usize, track: KeyframeTrack) -> Self {
        let tracks = self.channels.entry(bone.into()).or_default();
        if tracks.len() <= clip {
            tracks.resize_with(clip + 1, KeyframeTrack::default);
        }
        tracks[clip] = track;
        self
    }

    /// Append a mesh name
    pub fn mesh(mut self, name: impl Into<String>) -> Self {
        self.mesh_names.push(name.into());
        self
    }

    /// Override the global inverse transform (defaults to the root's inverse rest transform)
    pub fn global_inverse_transform(mut self, transform: Mat4) -> Self {
        self.global_inverse_transform = Some(transform);
        self
    }

    /// Validate and freeze the model data
    pub fn build(self, options: &AnimationOptions) -> Result<ModelAnimationData> {
        let root = self.tree.root().ok_or(AnimError::MissingRoot)?;

        let clips: Vec<_> = self
            .clips
            .into_iter()
            .map(|(name, duration, rate)| {
                AnimationClip::new(name, duration, rate, options.default_ticks_per_second)
            })
            .collect();

        for (bone, tracks) in &self.channels {
            self.tree.require_node(bone)?;
            if tracks.len() > clips.len() {
                return Err(AnimError::TrackClipMismatch {
                    bone: bone.clone(),
                    tracks: tracks.len(),
                    clips: clips.len(),
                });
            }
            if options.validate_keyframes {
                for (clip, track) in tracks.iter().enumerate() {
                    track.validate(bone, clip)?;
                }
            }
        }

        let global_inverse_transform = self
            .global_inverse_transform
            .unwrap_or_else(|| self.tree[root].local_transform().inverse());
        let bone_count = self.tree.bone_count();

        log::debug!(
            "Built model '{}': {} nodes, {} bones, {} clips, {} animated bones",
            self.name,
            self.tree.len(),
            bone_count,
            clips.len(),
            self.channels.len()
        );

        Ok(ModelAnimationData {
            name: self.name,
            tree: self.tree,
            channels: self.channels,
            clips,
            global_inverse_transform,
            bone_count,
            mesh_names: self.mesh_names,
        })
    }
}
