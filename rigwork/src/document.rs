//! JSON rig documents
//!
//! A rig document describes one model: its meshes, bone hierarchy, clips
//! and per-clip keyframes. Bones are listed parents first; the single bone
//! without a parent is the root.

use anyhow::{Context, Result, bail};
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rig_anim::{
    AnimationOptions, BoneData, BoneTree, KeyframeTrack, ModelAnimationData, QuatKey, VectorKey,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigDocument {
    pub name: String,
    #[serde(default)]
    pub meshes: Vec<String>,
    pub bones: Vec<BoneEntry>,
    #[serde(default)]
    pub clips: Vec<ClipEntry>,
    /// Bone name to one track per clip, in clip order
    #[serde(default)]
    pub channels: BTreeMap<String, Vec<TrackEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneEntry {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Palette index; absent for structural nodes
    #[serde(default)]
    pub bone_id: Option<usize>,
    #[serde(default)]
    pub translation: [f32; 3],
    /// Quaternion as `[x, y, z, w]`
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    /// Column-major inverse bind matrix
    #[serde(default)]
    pub offset: Option<[f32; 16]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipEntry {
    pub name: String,
    pub duration: f64,
    #[serde(default)]
    pub ticks_per_second: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackEntry {
    #[serde(default)]
    pub positions: Vec<VectorKeyEntry>,
    #[serde(default)]
    pub rotations: Vec<RotationKeyEntry>,
    #[serde(default)]
    pub scalings: Vec<VectorKeyEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorKeyEntry {
    pub time: f64,
    pub value: [f32; 3],
}

/// Rotation key; `value` is `[x, y, z, w]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationKeyEntry {
    pub time: f64,
    pub value: [f32; 4],
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// Normalized rotation; zero-length or non-finite quaternions are rejected
fn rotation(value: [f32; 4], context: impl FnOnce() -> String) -> Result<Quat> {
    let quat = Quat::from_array(value);
    let length = quat.length();
    if !length.is_finite() || length <= f32::EPSILON {
        bail!("{}: rotation {:?} has no direction", context(), value);
    }
    Ok(quat / length)
}

impl RigDocument {
    /// Read and parse a rig document
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rig document {}", path.display()))?;
        let document: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse rig document {}", path.display()))?;
        log::debug!(
            "Loaded rig '{}': {} bones, {} clips",
            document.name,
            document.bones.len(),
            document.clips.len()
        );
        Ok(document)
    }

    /// Build the bone tree described by `bones`
    pub fn bone_tree(&self) -> Result<BoneTree> {
        let mut tree = BoneTree::new();
        for bone in &self.bones {
            let local = Mat4::from_scale_rotation_translation(
                Vec3::from_array(bone.scale),
                rotation(bone.rotation, || format!("Bone '{}'", bone.name))?,
                Vec3::from_array(bone.translation),
            );
            let data = match bone.bone_id {
                Some(id) => BoneData::bone(
                    id,
                    local,
                    bone.offset.map_or(Mat4::IDENTITY, |m| Mat4::from_cols_array(&m)),
                ),
                None => BoneData::structural(local),
            };

            match &bone.parent {
                None => {
                    tree.add_root_node(bone.name.as_str(), data)
                        .with_context(|| format!("Bone '{}' cannot be the root", bone.name))?;
                }
                Some(parent) => {
                    let Some(parent_id) = tree.find_node_by(parent) else {
                        bail!(
                            "Bone '{}' refers to parent '{}' which is not listed before it",
                            bone.name,
                            parent
                        );
                    };
                    tree.add_node(parent_id, bone.name.as_str(), data)
                        .with_context(|| format!("Failed to add bone '{}'", bone.name))?;
                }
            }
        }
        Ok(tree)
    }

    /// Convert into the model data the animation core consumes
    pub fn to_model(&self, options: &AnimationOptions) -> Result<ModelAnimationData> {
        let mut builder = ModelAnimationData::builder(self.name.as_str(), self.bone_tree()?);

        for clip in &self.clips {
            builder = builder.clip(clip.name.as_str(), clip.duration, clip.ticks_per_second);
        }
        for (bone, tracks) in &self.channels {
            for (clip, track) in tracks.iter().enumerate() {
                let track = track
                    .to_track()
                    .with_context(|| format!("Bad keyframes for '{bone}' in clip {clip}"))?;
                builder = builder.track(bone.as_str(), clip, track);
            }
        }
        for mesh in &self.meshes {
            builder = builder.mesh(mesh.as_str());
        }

        builder
            .build(options)
            .with_context(|| format!("Invalid rig '{}'", self.name))
    }
}

impl TrackEntry {
    fn to_track(&self) -> Result<KeyframeTrack> {
        let rotations = self
            .rotations
            .iter()
            .map(|key| {
                rotation(key.value, || format!("Rotation key at {}", key.time))
                    .map(|value| QuatKey::new(key.time, value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(KeyframeTrack::new()
            .with_positions(
                self.positions
                    .iter()
                    .map(|key| VectorKey::new(key.time, Vec3::from_array(key.value)))
                    .collect(),
            )
            .with_rotations(rotations)
            .with_scalings(
                self.scalings
                    .iter()
                    .map(|key| VectorKey::new(key.time, Vec3::from_array(key.value)))
                    .collect(),
            ))
    }
}
