//! Error types for tumorlens_explain.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`ExplainError`].
pub type Result<T> = std::result::Result<T, ExplainError>;

/// Errors raised while computing or rendering an attribution.
#[derive(Error, Debug)]
pub enum ExplainError {
    /// No layer matched the request.
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    /// The requested layer has no spatial layout to attribute over.
    #[error("Layer '{layer}' is {kind} and has no spatial feature map")]
    NonSpatialLayer {
        /// Requested layer id.
        layer: String,
        /// Kind reported by the classifier.
        kind: tumorlens_core::LayerKind,
    },

    /// The classifier never routed the target layer through the feature tap.
    #[error("Classifier did not expose layer '{layer}' during the forward pass")]
    TapNotTriggered {
        /// Target layer id.
        layer: String,
    },

    /// The backward pass produced no gradient for the target layer.
    #[error("Failed to compute gradients for layer '{layer}': it is not connected to the output")]
    GradientUnavailable {
        /// Target layer id.
        layer: String,
    },

    /// The requested output column does not exist.
    #[error("Class index {index} out of range for {n_outputs} outputs")]
    ClassIndexOutOfRange {
        /// Requested column.
        index: usize,
        /// Number of classifier outputs.
        n_outputs: usize,
    },

    /// Activation/gradient data or a saliency grid is malformed.
    #[error("Invalid saliency data: {0}")]
    InvalidSaliency(String),

    /// The source image could not be read or decoded.
    #[error("Could not read image from path: {}", path.display())]
    SourceImageUnreadable {
        /// Path that was read.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The overlay could not be written.
    #[error("Failed to write overlay to {}", path.display())]
    WriteFailure {
        /// Destination path.
        path: PathBuf,
        /// Underlying encoder or I/O error.
        #[source]
        source: image::ImageError,
    },

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] tumorlens_core::CoreError),
}
