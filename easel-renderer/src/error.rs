//! Renderer error types.

use easel_core::CanvasError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while constructing or driving a renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No suitable rendering backend available.
    #[error("No rendering backend available: {0}")]
    NoBackend(String),

    /// A backend operation failed.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The active backend lacks a capability the call needs.
    #[error("Unsupported by backend '{backend}': {operation}")]
    Unsupported {
        /// Backend type name.
        backend: String,
        /// Operation that was attempted.
        operation: String,
    },

    /// Scene manipulation failed.
    #[error("Scene error: {0}")]
    Scene(#[from] CanvasError),
}
