//! Error types for sketch operations.

use thiserror::Error;

/// Result type for sketch operations.
pub type SketchResult<T> = Result<T, SketchError>;

/// Errors that can occur in sketch operations.
#[derive(Debug, Error)]
pub enum SketchError {
    /// Element not found in the document.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Text annotation not found in the document.
    #[error("Text annotation not found: {0}")]
    TextNotFound(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unknown tool name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}
