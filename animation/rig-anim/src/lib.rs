//! Skeletal animation core.
//!
//! This crate turns a model's bone hierarchy and keyframed clips into the
//! per-bone skinning matrices a renderer uploads every frame, and drives
//! per-instance playback of those clips.
//!
//! # Overview
//!
//! - [`BoneTree`]: arena-backed bone hierarchy with name lookup
//! - [`KeyframeTrack`]: position, rotation and scale keys of one bone in one clip
//! - [`AnimationClip`]: clip duration and tick rate
//! - [`ModelAnimationData`]: everything a model shares between its instances
//! - [`ModelRegistry`]: palette range reservation and the skinning palette
//! - [`PoseEvaluator`] / [`AnimSystem`]: per-frame pose computation
//! - [`PlaybackManager`]: play/pause/stop over a [`Clock`]
//! - [`SolidToModelManager`]: per-instance clip selection, speed, visibility
//!   and clip time
//! - [`PoseConsumer`] / [`Solid`]: what a renderer may ask of a placed object
//!
//! # Example
//!
//! ```
//! use glam::{Mat4, Vec3};
//! use rig_anim::{
//!     AnimSystem, AnimationOptions, BoneData, BoneTree, KeyframeTrack, ManualClock,
//!     ModelAnimationData, VectorKey,
//! };
//!
//! # fn main() -> rig_anim::Result<()> {
//! let mut tree = BoneTree::new();
//! let root = tree.add_root_node("Root", BoneData::structural(Mat4::IDENTITY))?;
//! tree.add_node(root, "Arm", BoneData::bone(0, Mat4::IDENTITY, Mat4::IDENTITY))?;
//!
//! let options = AnimationOptions::default();
//! let model = ModelAnimationData::builder("Crane", tree)
//!     .clip("Swing", 50.0, 25.0)
//!     .track(
//!         "Arm",
//!         0,
//!         KeyframeTrack::new().with_positions(vec![
//!             VectorKey::new(0.0, Vec3::ZERO),
//!             VectorKey::new(50.0, Vec3::new(0.0, 5.0, 0.0)),
//!         ]),
//!     )
//!     .build(&options)?;
//!
//! let mut system = AnimSystem::new(options);
//! let id = system.register_model(model);
//!
//! let clock = ManualClock::new();
//! let mut crane = system.create_instance(id, clock.clone())?;
//! crane.play(true)?;
//! clock.advance_secs(1.0);
//!
//! let ticks = system.animate(&mut crane)?;
//! assert!((ticks - 25.0).abs() < 1e-6);
//!
//! let arm = system.palette()[0].transform_point3(Vec3::ZERO);
//! assert!((arm.y - 2.5).abs() < 1e-5);
//! # Ok(())
//! # }
//! ```

pub mod bone_tree;
pub mod clip;
pub mod clock;
pub mod config;
pub mod consumer;
pub mod error;
pub mod keyframe;
pub mod model;
pub mod playback;
pub mod pose;
pub mod registry;
pub mod snapshot;
pub mod solid_manager;

// Re-export common types
pub use bone_tree::{BoneData, BoneNode, BoneTree, DepthFirst, NodeId};
pub use clip::AnimationClip;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AnimationOptions, DEFAULT_TICKS_PER_SECOND, PaletteMode};
pub use consumer::{AnimationControl, PoseConsumer, Solid, StaticSolid};
pub use error::{AnimError, Result};
pub use keyframe::{Keyframe, KeyframeTrack, Lerp, QuatKey, VectorKey, interpolate_key};
pub use model::{ModelAnimationData, ModelAnimationDataBuilder};
pub use playback::{PlaybackManager, PlaybackState};
pub use pose::{AnimSystem, PoseEvaluator};
pub use registry::{ModelId, ModelRegistry, PaletteSlot};
pub use snapshot::PlaybackSnapshot;
pub use solid_manager::SolidToModelManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
