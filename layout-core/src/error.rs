//! Error types for layout operations.

use thiserror::Error;

/// Result type for layout operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in layout operations.
///
/// Only construction-time and persistence failures are errors. Interactive
/// gestures clamp, and operations on unknown object ids are silently ignored.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Document dimensions or margins violate the document invariants.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// No preset with this id exists in the catalog.
    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    /// A preset definition is malformed or duplicated.
    #[error("Invalid preset: {0}")]
    InvalidPreset(String),

    /// A colour string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Layout serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Style repository failure.
    #[error("Style error: {0}")]
    Style(String),

    /// I/O failure while reading or writing persisted data.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
