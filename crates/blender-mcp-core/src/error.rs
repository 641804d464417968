//! Error types for scene hosts

use std::path::PathBuf;

use thiserror::Error;

use crate::host::ObjectType;

/// Result type alias using the host's error type
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Errors raised by a [`SceneHost`](crate::SceneHost) implementation
#[derive(Error, Debug)]
pub enum HostError {
    /// The host integration itself cannot be reached
    #[error("bpy module not found")]
    Unavailable,

    /// No object with this name exists
    #[error("Object '{0}' not found")]
    ObjectNotFound(String),

    /// No material with this name exists
    #[error("Material '{0}' not found")]
    MaterialNotFound(String),

    /// A material with this name already exists
    #[error("Material '{0}' already exists")]
    MaterialExists(String),

    /// The object exists but is not a camera
    #[error("Object '{name}' is not a camera (type: {object_type})")]
    NotACamera { name: String, object_type: ObjectType },

    /// Rendering requires a scene camera
    #[error("No active camera found. Create a camera before rendering.")]
    NoActiveCamera,

    /// Document path does not exist
    #[error("File not found: '{}'", .0.display())]
    FileNotFound(PathBuf),

    /// The operation is not supported for this object
    #[error("{0}")]
    Unsupported(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Document could not be read or written
    #[error("Invalid scene document: {0}")]
    Document(#[from] serde_json::Error),
}
