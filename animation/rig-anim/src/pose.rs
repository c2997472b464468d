//! Per-frame pose evaluation
//!
//! [`PoseEvaluator`] walks a model's bone tree in pre-order, samples each
//! bone's keyframes for the active clip, composes local transforms down the
//! hierarchy and writes the final skinning matrices into the palette.
//! [`AnimSystem`] ties the evaluator to the model registry and to the
//! per-instance playback managers.

use glam::Mat4;
use std::sync::Arc;

use crate::bone_tree::NodeId;
use crate::clock::Clock;
use crate::config::AnimationOptions;
use crate::consumer::Solid;
use crate::error::{AnimError, Result};
use crate::model::ModelAnimationData;
use crate::registry::{ModelId, ModelRegistry};
use crate::solid_manager::SolidToModelManager;

/// Reusable scratch state for pose computation.
///
/// After an evaluation the local, global and final transform of every node
/// of the last evaluated model can be inspected by [`NodeId`].
#[derive(Debug, Clone, Default)]
pub struct PoseEvaluator {
    locals: Vec<Mat4>,
    globals: Vec<Mat4>,
    finals: Vec<Mat4>,
}

impl PoseEvaluator {
    /// Create an evaluator with empty scratch buffers
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `model` under clip `clip_index` at `time` ticks.
    ///
    /// Bone `id` is written to `palette[starting_index + id]`; structural
    /// nodes never touch the palette. Returns the number of matrices
    /// written.
    pub fn evaluate_pose(
        &mut self,
        model: &ModelAnimationData,
        clip_index: usize,
        time: f64,
        palette: &mut [Mat4],
        starting_index: usize,
    ) -> Result<usize> {
        model.clip(clip_index)?;
        self.evaluate(model, Some(clip_index), time, palette, starting_index)
    }

    /// Write the rest pose of `model`, ignoring every keyframe
    pub fn evaluate_rest_pose(
        &mut self,
        model: &ModelAnimationData,
        palette: &mut [Mat4],
        starting_index: usize,
    ) -> Result<usize> {
        self.evaluate(model, None, 0.0, palette, starting_index)
    }

    fn evaluate(
        &mut self,
        model: &ModelAnimationData,
        clip: Option<usize>,
        time: f64,
        palette: &mut [Mat4],
        starting_index: usize,
    ) -> Result<usize> {
        let end = starting_index + model.bone_count();
        if end > palette.len() {
            return Err(AnimError::IndexOutOfRange {
                what: "palette",
                index: end,
                len: palette.len(),
            });
        }

        let tree = model.tree();
        let node_count = tree.len();
        self.locals.clear();
        self.locals.resize(node_count, Mat4::IDENTITY);
        self.globals.clear();
        self.globals.resize(node_count, Mat4::IDENTITY);
        self.finals.clear();
        self.finals.resize(node_count, Mat4::IDENTITY);

        let global_inverse = model.global_inverse_transform();
        let mut written = 0;

        // Pre-order guarantees a parent's global transform is final before
        // any of its children is visited. The root takes the same path with
        // an identity parent: a structural, unanimated root ends up with
        // its rest transform as global and writes no palette entry.
        for id in tree.depth_first() {
            let node = &tree[id];
            let rest = node.local_transform();
            let local = clip
                .and_then(|clip| model.track(node.name(), clip))
                .and_then(|track| track.sample(time, &rest))
                .unwrap_or(rest);

            let parent_global = node
                .parent()
                .map_or(Mat4::IDENTITY, |parent| self.globals[parent.index()]);
            let global = parent_global * local;

            self.locals[id.index()] = local;
            self.globals[id.index()] = global;

            if let Some(bone_id) = node.bone_id() {
                let final_transform = global_inverse * global * node.offset_matrix();
                self.finals[id.index()] = final_transform;
                palette[starting_index + bone_id] = final_transform;
                written += 1;
            }
        }

        log::trace!(
            "Evaluated '{}' clip {:?} at {:.3} ticks: {} bones into palette[{}..{}]",
            model.name(),
            clip,
            time,
            written,
            starting_index,
            end
        );
        Ok(written)
    }

    /// Local transform of `node` from the last evaluation
    pub fn local_transform(&self, node: NodeId) -> Option<Mat4> {
        self.locals.get(node.index()).copied()
    }

    /// Global transform of `node` from the last evaluation
    pub fn global_transform(&self, node: NodeId) -> Option<Mat4> {
        self.globals.get(node.index()).copied()
    }

    /// Final skinning transform of `node` from the last evaluation
    /// (identity for structural nodes)
    pub fn final_transform(&self, node: NodeId) -> Option<Mat4> {
        self.finals.get(node.index()).copied()
    }
}

/// Frame driver owning the model registry, its palette and an evaluator
#[derive(Debug, Default)]
pub struct AnimSystem {
    registry: ModelRegistry,
    evaluator: PoseEvaluator,
}

impl AnimSystem {
    /// Create a system with an empty registry
    pub fn new(options: AnimationOptions) -> Self {
        Self {
            registry: ModelRegistry::new(options),
            evaluator: PoseEvaluator::new(),
        }
    }

    /// Model registry
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Mutable model registry
    pub fn registry_mut(&mut self) -> &mut ModelRegistry {
        &mut self.registry
    }

    /// Evaluator holding the transforms of the last evaluated model
    pub fn evaluator(&self) -> &PoseEvaluator {
        &self.evaluator
    }

    /// The whole skinning palette
    pub fn palette(&self) -> &[Mat4] {
        self.registry.palette()
    }

    /// Register a model (once per distinct model name)
    pub fn register_model(&mut self, data: impl Into<Arc<ModelAnimationData>>) -> ModelId {
        self.registry.register(data)
    }

    /// Create an initialized playback manager for a new instance of `model`
    pub fn create_instance<C: Clock>(
        &mut self,
        model: ModelId,
        clock: C,
    ) -> Result<SolidToModelManager<C>> {
        let slot = self.registry.attach_instance(model)?;
        let data = self.registry.model(model)?.clone();
        let mut manager = SolidToModelManager::new(clock);
        manager.initialize_registered(model, data, slot);
        Ok(manager)
    }

    /// Advance one instance: compute its clip time and write its pose.
    ///
    /// Returns the clip time in ticks that was evaluated. Instances of a
    /// model that has since been removed from the registry are rejected
    /// with [`AnimError::UnknownModel`] and leave the palette untouched.
    pub fn animate<C: Clock>(&mut self, instance: &mut SolidToModelManager<C>) -> Result<f64> {
        if let Some(id) = instance.model_id()? {
            self.registry.slot(id)?;
        }
        let time = instance.current_animation_time()?;
        let clip = instance.current_animation_index()?;
        let start = instance.starting_bone_index(clip)?;
        let model = instance.model()?;

        self.evaluator
            .evaluate_pose(model, clip, time, self.registry.palette_mut(), start)?;
        Ok(time)
    }

    /// Animate every skinned solid in `solids`; returns how many were posed
    pub fn animate_all<C: Clock>(&mut self, solids: &mut [Solid<C>]) -> Result<usize> {
        let mut posed = 0;
        for solid in solids.iter_mut() {
            if let Solid::Animated(instance) = solid {
                self.animate(instance)?;
                posed += 1;
            }
        }
        Ok(posed)
    }
}
