//! Model registry and the process-wide skinning palette
//!
//! Registering a model reserves a contiguous range of the palette sized to
//! its bone count. The running total of reserved bones decides the palette
//! length. Ranges are never reused: removing a model resets its range to
//! identity and retires the id.

use glam::Mat4;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use crate::config::{AnimationOptions, PaletteMode};
use crate::error::{AnimError, Result};
use crate::model::ModelAnimationData;

/// Handle of a registered model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(pub u32);

/// Contiguous range of the skinning palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaletteSlot {
    /// Index of the first matrix (the model's starting bone index)
    pub start: usize,
    /// Number of matrices
    pub len: usize,
}

impl PaletteSlot {
    /// Palette indices covered by this slot
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

#[derive(Debug)]
struct RegisteredModel {
    data: Arc<ModelAnimationData>,
    slot: PaletteSlot,
    extra_slots: Vec<PaletteSlot>,
    instances: usize,
}

/// Owner of all loaded models and their palette ranges
#[derive(Debug, Default)]
pub struct ModelRegistry {
    options: AnimationOptions,
    models: Vec<Option<RegisteredModel>>,
    by_name: HashMap<String, ModelId>,
    total_bones: usize,
    palette: Vec<Mat4>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new(options: AnimationOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Options the registry was created with
    pub fn options(&self) -> &AnimationOptions {
        &self.options
    }

    /// Register a model and reserve its palette range.
    ///
    /// Registering a second model under an already registered name returns
    /// the existing id; the bone total only grows once per distinct model.
    pub fn register(&mut self, data: impl Into<Arc<ModelAnimationData>>) -> ModelId {
        let data = data.into();
        if let Some(&id) = self.by_name.get(data.name()) {
            log::debug!("Model '{}' already registered as {:?}", data.name(), id);
            return id;
        }

        let slot = self.allocate(data.bone_count());
        let id = ModelId(self.models.len() as u32);
        log::debug!(
            "Registered model '{}' as {:?}: bones {:?}, palette now {} matrices",
            data.name(),
            id,
            slot.range(),
            self.total_bones
        );

        self.by_name.insert(data.name().to_string(), id);
        self.models.push(Some(RegisteredModel {
            data,
            slot,
            extra_slots: Vec::new(),
            instances: 0,
        }));
        id
    }

    fn allocate(&mut self, len: usize) -> PaletteSlot {
        let slot = PaletteSlot {
            start: self.total_bones,
            len,
        };
        self.total_bones += len;
        self.palette.resize(self.total_bones, Mat4::IDENTITY);
        slot
    }

    fn entry(&self, id: ModelId) -> Result<&RegisteredModel> {
        self.models
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(AnimError::UnknownModel(id))
    }

    fn entry_mut(&mut self, id: ModelId) -> Result<&mut RegisteredModel> {
        self.models
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(AnimError::UnknownModel(id))
    }

    /// Id of the model registered under `name`
    pub fn find(&self, name: &str) -> Option<ModelId> {
        self.by_name.get(name).copied()
    }

    /// Shared animation data of a model
    pub fn model(&self, id: ModelId) -> Result<&Arc<ModelAnimationData>> {
        self.entry(id).map(|entry| &entry.data)
    }

    /// Palette range reserved at registration
    pub fn slot(&self, id: ModelId) -> Result<PaletteSlot> {
        self.entry(id).map(|entry| entry.slot)
    }

    /// Hand out the palette range an instance of `id` should write into.
    ///
    /// With [`PaletteMode::SharedPerModel`] every instance gets the model's
    /// range. With [`PaletteMode::PerInstance`] the first instance gets the
    /// model's range and each further one a freshly reserved range.
    pub fn attach_instance(&mut self, id: ModelId) -> Result<PaletteSlot> {
        let mode = self.options.palette_mode;
        let (instances, bone_count, slot) = {
            let entry = self.entry_mut(id)?;
            entry.instances += 1;
            (entry.instances, entry.data.bone_count(), entry.slot)
        };

        match mode {
            PaletteMode::SharedPerModel => Ok(slot),
            PaletteMode::PerInstance if instances == 1 => Ok(slot),
            PaletteMode::PerInstance => {
                let extra = self.allocate(bone_count);
                log::debug!("Instance {} of {:?} gets bones {:?}", instances, id, extra.range());
                self.entry_mut(id)?.extra_slots.push(extra);
                Ok(extra)
            }
        }
    }

    /// Number of instances attached to `id`
    pub fn instance_count(&self, id: ModelId) -> Result<usize> {
        self.entry(id).map(|entry| entry.instances)
    }

    /// Unregister a model and reset its palette ranges to identity
    pub fn remove_model(&mut self, id: ModelId) -> Result<Arc<ModelAnimationData>> {
        let Some(entry) = self.models.get_mut(id.0 as usize).and_then(Option::take) else {
            log::warn!("Tried to remove unknown model {:?}", id);
            return Err(AnimError::UnknownModel(id));
        };

        for slot in std::iter::once(&entry.slot).chain(&entry.extra_slots) {
            self.palette[slot.range()].fill(Mat4::IDENTITY);
        }
        self.by_name.remove(entry.data.name());
        log::debug!("Removed model '{}' ({:?})", entry.data.name(), id);
        Ok(entry.data)
    }

    /// Registered models
    pub fn models(&self) -> impl Iterator<Item = (ModelId, &Arc<ModelAnimationData>)> {
        self.models.iter().enumerate().filter_map(|(index, entry)| {
            entry
                .as_ref()
                .map(|entry| (ModelId(index as u32), &entry.data))
        })
    }

    /// Bones reserved so far, which is also the palette length
    pub fn total_bones(&self) -> usize {
        self.total_bones
    }

    /// The whole skinning palette
    pub fn palette(&self) -> &[Mat4] {
        &self.palette
    }

    /// Mutable access to the whole palette
    pub fn palette_mut(&mut self) -> &mut [Mat4] {
        &mut self.palette
    }

    /// Matrices of one slot
    pub fn palette_slice(&self, slot: PaletteSlot) -> Result<&[Mat4]> {
        let len = self.palette.len();
        self.palette
            .get(slot.range())
            .ok_or(AnimError::IndexOutOfRange {
                what: "palette",
                index: slot.start + slot.len,
                len,
            })
    }
}
