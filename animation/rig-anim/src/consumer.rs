//! What a renderer or script may ask of a placed object
//!
//! Every placed object exposes the same small capability set through
//! [`PoseConsumer`]: where its skinning matrices live, per-mesh visibility,
//! and, for skinned objects only, animation control.

use glam::Mat4;

use crate::clock::{Clock, SystemClock};
use crate::error::{AnimError, Result};
use crate::registry::PaletteSlot;
use crate::solid_manager::SolidToModelManager;

/// Transport and clip selection of an animated object
pub trait AnimationControl {
    /// Start or resume playback
    fn play(&mut self, looped: bool) -> Result<()>;

    /// Freeze playback
    fn pause(&mut self) -> Result<()>;

    /// Stop and rewind
    fn stop(&mut self) -> Result<()>;

    /// Set the playback speed multiplier
    fn set_speed(&mut self, speed: f64) -> Result<()>;

    /// Select a clip by name
    fn select_clip(&mut self, name: &str) -> Result<()>;
}

impl<C: Clock> AnimationControl for SolidToModelManager<C> {
    fn play(&mut self, looped: bool) -> Result<()> {
        SolidToModelManager::play(self, looped)
    }

    fn pause(&mut self) -> Result<()> {
        SolidToModelManager::pause(self)
    }

    fn stop(&mut self) -> Result<()> {
        SolidToModelManager::stop(self)
    }

    fn set_speed(&mut self, speed: f64) -> Result<()> {
        self.set_animation_speed(speed)
    }

    fn select_clip(&mut self, name: &str) -> Result<()> {
        self.set_current_animation_by_name(name)
    }
}

/// Capability set shared by every placed object
pub trait PoseConsumer {
    /// Palette range holding this object's skinning matrices, if it has any
    fn palette_slot(&self) -> Option<PaletteSlot>;

    /// This object's skinning matrices within the shared `palette`
    fn final_transforms<'p>(&self, palette: &'p [Mat4]) -> Option<&'p [Mat4]> {
        palette.get(self.palette_slot()?.range())
    }

    /// Number of meshes
    fn mesh_count(&self) -> usize;

    /// Visibility of mesh `index`
    fn is_mesh_visible(&self, index: usize) -> Result<bool>;

    /// Show or hide mesh `index`
    fn set_mesh_visible(&mut self, index: usize, visible: bool) -> Result<()>;

    /// Animation control, for objects that animate
    fn animation_control(&mut self) -> Option<&mut dyn AnimationControl>;
}

/// Mesh-only object without a skeleton
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSolid {
    mesh_names: Vec<String>,
    visibility: Vec<bool>,
}

impl StaticSolid {
    /// Object whose meshes all start visible
    pub fn new<I, S>(mesh_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mesh_names: Vec<String> = mesh_names.into_iter().map(Into::into).collect();
        Self {
            visibility: vec![true; mesh_names.len()],
            mesh_names,
        }
    }

    /// Mesh names in draw order
    pub fn mesh_names(&self) -> &[String] {
        &self.mesh_names
    }

    fn check(&self, index: usize) -> Result<usize> {
        if index < self.visibility.len() {
            Ok(index)
        } else {
            Err(AnimError::IndexOutOfRange {
                what: "mesh",
                index,
                len: self.visibility.len(),
            })
        }
    }
}

impl PoseConsumer for StaticSolid {
    fn palette_slot(&self) -> Option<PaletteSlot> {
        None
    }

    fn mesh_count(&self) -> usize {
        self.mesh_names.len()
    }

    fn is_mesh_visible(&self, index: usize) -> Result<bool> {
        Ok(self.visibility[self.check(index)?])
    }

    fn set_mesh_visible(&mut self, index: usize, visible: bool) -> Result<()> {
        let index = self.check(index)?;
        self.visibility[index] = visible;
        Ok(())
    }

    fn animation_control(&mut self) -> Option<&mut dyn AnimationControl> {
        None
    }
}

/// A placed object, by category
#[derive(Debug, Clone)]
pub enum Solid<C: Clock = SystemClock> {
    /// Rigid meshes
    Static(StaticSolid),
    /// Skinned model driven by its own playback manager
    Animated(SolidToModelManager<C>),
}

impl<C: Clock> PoseConsumer for Solid<C> {
    fn palette_slot(&self) -> Option<PaletteSlot> {
        match self {
            Solid::Static(_) => None,
            Solid::Animated(instance) => instance.palette_slot().ok(),
        }
    }

    fn mesh_count(&self) -> usize {
        match self {
            Solid::Static(solid) => solid.mesh_count(),
            Solid::Animated(instance) => instance.mesh_visibilities().map_or(0, <[bool]>::len),
        }
    }

    fn is_mesh_visible(&self, index: usize) -> Result<bool> {
        match self {
            Solid::Static(solid) => solid.is_mesh_visible(index),
            Solid::Animated(instance) => instance.mesh_visibility(index),
        }
    }

    fn set_mesh_visible(&mut self, index: usize, visible: bool) -> Result<()> {
        match self {
            Solid::Static(solid) => solid.set_mesh_visible(index, visible),
            Solid::Animated(instance) => instance.set_mesh_visibility(index, visible),
        }
    }

    fn animation_control(&mut self) -> Option<&mut dyn AnimationControl> {
        match self {
            Solid::Static(_) => None,
            Solid::Animated(instance) => Some(instance as &mut dyn AnimationControl),
        }
    }
}

impl<C: Clock> From<StaticSolid> for Solid<C> {
    fn from(solid: StaticSolid) -> Self {
        Solid::Static(solid)
    }
}

impl<C: Clock> From<SolidToModelManager<C>> for Solid<C> {
    fn from(instance: SolidToModelManager<C>) -> Self {
        Solid::Animated(instance)
    }
}
