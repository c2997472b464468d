use thiserror::Error;

use crate::registry::ModelId;

/// Error types for skeleton construction, pose evaluation and playback control
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimError {
    /// A playback operation was issued before `initialize`
    #[error("Animation manager is not initialized")]
    NotInitialized,

    /// Clip, mesh or palette index outside the valid range
    #[error("{what} index {index} outside range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// No clip with the requested name
    #[error("Unknown animation clip: {0}")]
    UnknownClip(String),

    /// No mesh with the requested name
    #[error("Unknown mesh: {0}")]
    UnknownMesh(String),

    /// A bone name is not present in the tree
    #[error("Bone not found: {0}")]
    BoneNotFound(String),

    /// Two nodes in one tree share a name
    #[error("Duplicate bone name: {0}")]
    DuplicateBoneName(String),

    /// `add_root_node` called on a tree that already has a root
    #[error("Bone tree already has a root: {0}")]
    RootAlreadySet(String),

    /// The tree has no root node
    #[error("Bone tree has no root node")]
    MissingRoot,

    /// Keyframe times decrease inside one sequence
    #[error("Keyframes out of order in {channel} channel of bone '{bone}', clip {clip}")]
    UnsortedKeyframes {
        bone: String,
        clip: usize,
        channel: &'static str,
    },

    /// A bone carries tracks for more clips than the model declares
    #[error("Bone '{bone}' has {tracks} tracks but the model has {clips} clips")]
    TrackClipMismatch {
        bone: String,
        tracks: usize,
        clips: usize,
    },

    /// The model id is not (or no longer) registered
    #[error("Unknown model: {0:?}")]
    UnknownModel(ModelId),
}

/// Result type using `AnimError`
pub type Result<T> = std::result::Result<T, AnimError>;
