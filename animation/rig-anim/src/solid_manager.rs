//! Per-instance playback façade
//!
//! A [`SolidToModelManager`] drives one placed instance of a model: it owns
//! the instance's [`PlaybackManager`], selected clip, speed and mesh
//! visibility, and turns elapsed wall-clock time into clip time in ticks.
//! The model data itself is shared with every other instance.

use std::sync::Arc;

use crate::clip::AnimationClip;
use crate::clock::{Clock, SystemClock};
use crate::error::{AnimError, Result};
use crate::model::ModelAnimationData;
use crate::playback::{PlaybackManager, PlaybackState};
use crate::registry::{ModelId, PaletteSlot};
use crate::snapshot::PlaybackSnapshot;

#[derive(Debug, Clone)]
struct Bound {
    model: Arc<ModelAnimationData>,
    model_id: Option<ModelId>,
    slot: PaletteSlot,
    starting_bone_index: Vec<usize>,
}

/// Playback controller for one instance of an animated model
#[derive(Debug, Clone)]
pub struct SolidToModelManager<C: Clock = SystemClock> {
    playback: PlaybackManager<C>,
    bound: Option<Bound>,
    current_animation_index: usize,
    animation_speed: f64,
    last_animation_time: f64,
    mesh_visibility: Vec<bool>,
}

impl Default for SolidToModelManager<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock::new())
    }
}

impl<C: Clock> SolidToModelManager<C> {
    /// Create an uninitialized manager
    pub fn new(clock: C) -> Self {
        Self {
            playback: PlaybackManager::new(clock),
            bound: None,
            current_animation_index: 0,
            animation_speed: 1.0,
            last_animation_time: 0.0,
            mesh_visibility: Vec::new(),
        }
    }

    /// Bind to a model and the palette range this instance writes into.
    ///
    /// Resets clip selection, speed, playback and mesh visibility.
    pub fn initialize(&mut self, model: Arc<ModelAnimationData>, slot: PaletteSlot) {
        log::debug!(
            "Instance bound to '{}' at palette {:?}",
            model.name(),
            slot.range()
        );
        self.playback.stop();
        self.current_animation_index = 0;
        self.animation_speed = 1.0;
        self.last_animation_time = 0.0;
        self.mesh_visibility = vec![true; model.mesh_names().len()];
        self.bound = Some(Bound {
            starting_bone_index: vec![slot.start; model.clips().len()],
            model,
            model_id: None,
            slot,
        });
    }

    /// Bind to a model held by a registry under `id`.
    ///
    /// Like [`initialize`](Self::initialize), but the instance remembers
    /// the id so a driver can refuse to pose it once the model is removed.
    pub fn initialize_registered(
        &mut self,
        id: ModelId,
        model: Arc<ModelAnimationData>,
        slot: PaletteSlot,
    ) {
        self.initialize(model, slot);
        if let Some(bound) = self.bound.as_mut() {
            bound.model_id = Some(id);
        }
    }

    /// Whether [`initialize`](Self::initialize) has been called
    pub fn is_initialized(&self) -> bool {
        self.bound.is_some()
    }

    fn bound(&self) -> Result<&Bound> {
        self.bound.as_ref().ok_or(AnimError::NotInitialized)
    }

    /// Shared model data
    pub fn model(&self) -> Result<&Arc<ModelAnimationData>> {
        self.bound().map(|bound| &bound.model)
    }

    /// Registry id of the bound model, if it was bound through a registry
    pub fn model_id(&self) -> Result<Option<ModelId>> {
        self.bound().map(|bound| bound.model_id)
    }

    /// Palette range of this instance
    pub fn palette_slot(&self) -> Result<PaletteSlot> {
        let bound = self.bound()?;
        // A model without clips still owns its range
        let start = bound
            .starting_bone_index
            .get(self.current_animation_index)
            .copied()
            .unwrap_or(bound.slot.start);
        Ok(PaletteSlot {
            start,
            len: bound.slot.len,
        })
    }

    /// First palette index written when clip `clip` is active
    pub fn starting_bone_index(&self, clip: usize) -> Result<usize> {
        let bound = self.bound()?;
        bound
            .starting_bone_index
            .get(clip)
            .copied()
            .ok_or(AnimError::IndexOutOfRange {
                what: "clip",
                index: clip,
                len: bound.starting_bone_index.len(),
            })
    }

    // Clip selection

    /// Number of clips of the model
    pub fn animation_count(&self) -> Result<usize> {
        Ok(self.model()?.clips().len())
    }

    /// Names of the model's clips
    pub fn animation_names(&self) -> Result<Vec<&str>> {
        Ok(self
            .model()?
            .clips()
            .iter()
            .map(|clip| clip.name.as_str())
            .collect())
    }

    /// Index of the selected clip
    pub fn current_animation_index(&self) -> Result<usize> {
        self.bound()?;
        Ok(self.current_animation_index)
    }

    /// The selected clip
    pub fn current_animation(&self) -> Result<&AnimationClip> {
        self.model()?.clip(self.current_animation_index)
    }

    /// Select a clip by index
    pub fn set_current_animation(&mut self, index: usize) -> Result<()> {
        self.model()?.clip(index)?;
        self.current_animation_index = index;
        self.last_animation_time = 0.0;
        Ok(())
    }

    /// Select a clip by name
    pub fn set_current_animation_by_name(&mut self, name: &str) -> Result<()> {
        let index = self
            .model()?
            .clip_index(name)
            .ok_or_else(|| AnimError::UnknownClip(name.to_string()))?;
        self.set_current_animation(index)
    }

    // Speed

    /// Playback speed multiplier
    pub fn animation_speed(&self) -> Result<f64> {
        self.bound()?;
        Ok(self.animation_speed)
    }

    /// Set the playback speed multiplier
    pub fn set_animation_speed(&mut self, speed: f64) -> Result<()> {
        self.bound()?;
        self.animation_speed = speed;
        Ok(())
    }

    // Transport

    /// Start or resume playback
    pub fn play(&mut self, looped: bool) -> Result<()> {
        self.bound()?;
        if self.playback.play(looped) == PlaybackState::Stopped {
            self.last_animation_time = 0.0;
        }
        Ok(())
    }

    /// Freeze playback
    pub fn pause(&mut self) -> Result<()> {
        self.bound()?;
        self.playback.pause();
        Ok(())
    }

    /// Stop playback and rewind
    pub fn stop(&mut self) -> Result<()> {
        self.bound()?;
        self.playback.stop();
        self.last_animation_time = 0.0;
        Ok(())
    }

    /// Current playback state
    pub fn playback_state(&self) -> Result<PlaybackState> {
        self.bound()?;
        Ok(self.playback.state())
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> Result<bool> {
        Ok(self.playback_state()? == PlaybackState::Playing)
    }

    /// Whether playback is frozen
    pub fn is_paused(&self) -> Result<bool> {
        Ok(self.playback_state()? == PlaybackState::Paused)
    }

    /// Whether the clip loops
    pub fn is_looped(&self) -> Result<bool> {
        self.bound()?;
        Ok(self.playback.is_looped())
    }

    /// Wall-clock seconds played so far
    pub fn elapsed_seconds(&self) -> Result<f64> {
        self.bound()?;
        Ok(self.playback.current_time())
    }

    /// Clip time in ticks for this frame.
    ///
    /// `ticks = elapsed * speed * ticks_per_second`, wrapped into the clip
    /// duration. A non-looping clip that wrapped since the previous call
    /// stops playback and reports 0 for this frame.
    pub fn current_animation_time(&mut self) -> Result<f64> {
        let clip = self.current_animation()?;
        let ticks = clip.seconds_to_ticks(self.playback.current_time(), self.animation_speed);
        let mut time = clip.wrap_ticks(ticks);

        if !self.playback.is_looped() && time < self.last_animation_time {
            log::debug!("Clip '{}' reached its end, stopping", clip.name);
            self.playback.stop();
            time = 0.0;
        }

        self.last_animation_time = time;
        Ok(time)
    }

    // Mesh visibility

    /// Mesh names of the model in draw order
    pub fn mesh_names(&self) -> Result<&[String]> {
        Ok(self.model()?.mesh_names())
    }

    /// Visibility flags of all meshes
    pub fn mesh_visibilities(&self) -> Result<&[bool]> {
        self.bound()?;
        Ok(&self.mesh_visibility)
    }

    fn mesh_slot(&self, index: usize) -> Result<usize> {
        self.bound()?;
        if index < self.mesh_visibility.len() {
            Ok(index)
        } else {
            Err(AnimError::IndexOutOfRange {
                what: "mesh",
                index,
                len: self.mesh_visibility.len(),
            })
        }
    }

    fn mesh_index(&self, name: &str) -> Result<usize> {
        self.model()?
            .mesh_index(name)
            .ok_or_else(|| AnimError::UnknownMesh(name.to_string()))
    }

    /// Visibility of mesh `index`
    pub fn mesh_visibility(&self, index: usize) -> Result<bool> {
        let index = self.mesh_slot(index)?;
        Ok(self.mesh_visibility[index])
    }

    /// Show or hide mesh `index`
    pub fn set_mesh_visibility(&mut self, index: usize, visible: bool) -> Result<()> {
        let index = self.mesh_slot(index)?;
        self.mesh_visibility[index] = visible;
        Ok(())
    }

    /// Visibility of the mesh named `name`
    pub fn mesh_visibility_by_name(&self, name: &str) -> Result<bool> {
        self.mesh_visibility(self.mesh_index(name)?)
    }

    /// Show or hide the mesh named `name`
    pub fn set_mesh_visibility_by_name(&mut self, name: &str, visible: bool) -> Result<()> {
        let index = self.mesh_index(name)?;
        self.set_mesh_visibility(index, visible)
    }

    // Persistence

    /// Capture the state a save file needs
    pub fn snapshot(&self) -> Result<PlaybackSnapshot> {
        self.bound()?;
        Ok(PlaybackSnapshot {
            clip_index: self.current_animation_index,
            speed: self.animation_speed,
            elapsed_seconds: self.playback.current_time(),
            state: self.playback.state(),
            looped: self.playback.is_looped(),
            mesh_visibility: self.mesh_visibility.clone(),
        })
    }

    /// Resume from a saved state
    pub fn restore(&mut self, snapshot: &PlaybackSnapshot) -> Result<()> {
        let model = self.model()?;
        let clip = model.clip(snapshot.clip_index)?;
        let mesh_count = model.mesh_names().len();
        if snapshot.mesh_visibility.len() != mesh_count {
            return Err(AnimError::IndexOutOfRange {
                what: "mesh",
                index: snapshot.mesh_visibility.len(),
                len: mesh_count,
            });
        }
        let resume_ticks =
            clip.wrap_ticks(clip.seconds_to_ticks(snapshot.elapsed_seconds, snapshot.speed));

        self.current_animation_index = snapshot.clip_index;
        self.animation_speed = snapshot.speed;
        self.mesh_visibility.clone_from(&snapshot.mesh_visibility);
        self.playback
            .restore(snapshot.state, snapshot.looped, snapshot.elapsed_seconds);
        self.last_animation_time = if snapshot.state == PlaybackState::Stopped {
            0.0
        } else {
            resume_ticks
        };
        Ok(())
    }
}
