//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Canvas size or pixel ratio is unusable.
    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    /// Drawing surface could not be acquired or resized.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Rendering frame failed.
    #[error("Frame render failed: {0}")]
    Frame(String),

    /// Export to an image format failed.
    #[error("Export failed: {0}")]
    Export(String),
}
