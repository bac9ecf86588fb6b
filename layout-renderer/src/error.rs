//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during export and ingestion.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Export options out of range.
    #[error("Invalid export options: {0}")]
    InvalidOptions(String),

    /// Drawing surface could not be created or drawn.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Output encoding failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Text could not be converted to outlines.
    #[error("Text outlining failed: {0}")]
    Outline(String),

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Zip packaging failed.
    #[error("Packaging failed: {0}")]
    Package(String),

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for RenderError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Package(e.to_string())
    }
}
