//! Error types for scene operations.

use thiserror::Error;

/// Result type for scene operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in scene operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Element not found in scene.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Invalid element operation.
    #[error("Invalid operation on element: {0}")]
    InvalidOperation(String),

    /// Color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
