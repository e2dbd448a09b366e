//! Error types for tumorlens_models.

use thiserror::Error;

/// Result type alias using [`ModelError`].
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while building, saving or loading models.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The model configuration cannot produce a valid network.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error saving checkpoint.
    #[error("Failed to save checkpoint: {0}")]
    Save(String),

    /// Error loading checkpoint.
    #[error("Failed to load checkpoint: {0}")]
    Load(String),
}
