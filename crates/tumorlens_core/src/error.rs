//! Error types for tumorlens_core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur in tumorlens_core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid tensor shape provided.
    #[error("Invalid shape: expected {expected}, got {got}")]
    InvalidShape {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        got: String,
    },

    /// Input values fall outside the [0, 1] range the classifier expects.
    #[error("Input values out of range: min {min}, max {max}")]
    ValueRange {
        /// Smallest value found.
        min: f32,
        /// Largest value found.
        max: f32,
    },

    /// The image at `path` could not be opened or decoded.
    #[error("Failed to load image {}: {source}", path.display())]
    ImageLoad {
        /// Path that was read.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },
}
