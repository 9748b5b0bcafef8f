//! Error types for the browser host.

use sketch_core::{ParseError, SketchError};
use sketch_renderer::RenderError;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Result type for host operations.
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced to JavaScript.
#[derive(Debug, Error)]
pub enum AppError {
    /// No browser window or document.
    #[error("Browser environment unavailable: {0}")]
    Environment(&'static str),

    /// No element with the given id.
    #[error("Canvas element '{0}' not found")]
    CanvasNotFound(String),

    /// The element exists but is not a `<canvas>`.
    #[error("Element '{0}' is not a canvas")]
    NotACanvas(String),

    /// The 2D context could not be acquired.
    #[error("2D context not available")]
    NoContext,

    /// Core logic rejected the input.
    #[error(transparent)]
    Sketch(#[from] SketchError),

    /// A generated diagram failed validation.
    #[error("Invalid diagram: {0}")]
    Diagram(#[from] ParseError),

    /// Rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<AppError> for JsValue {
    fn from(err: AppError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
