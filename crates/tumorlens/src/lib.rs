//! # tumorlens
//!
//! Brain tumor classification with Grad-CAM visual explanations in Rust.
//!
//! tumorlens runs a trained convolutional classifier on one MRI scan and shows
//! which regions drove the prediction:
//!
//! - **Core**: Input preprocessing, layer introspection, feature taps, diagnosis
//! - **Models**: The reference `TumorCnn` and checkpoint loading
//! - **Explainability**: Grad-CAM saliency maps and jet heatmap overlays
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tumorlens::prelude::*;
//!
//! let (model, config) = load_tumor_cnn::<Autodiff<NdArray>>("runs/cnn_model", &device)?;
//! let input = InputTensor::from_image_path("scan.png", config.input_size, &device)?;
//!
//! let diagnosis = classify(&model, &input)?;
//! let saliency = attribute(&model, &input, None)?;
//! composite(&saliency, "scan.png", "gradcam_output.png")?;
//! println!("{diagnosis}");
//! ```
//!
//! ## Feature Flags
//!
//! - `backend-ndarray` (default): CPU backend using ndarray
//! - `backend-wgpu`: GPU backend using WGPU (Metal on macOS, Vulkan on Linux/Windows)
//! - `backend-tch`: PyTorch backend via tch-rs

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export all crates
pub use tumorlens_core as core;
pub use tumorlens_explain as explain;
pub use tumorlens_models as models;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use tumorlens::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tumorlens_core::{
        classify, Diagnosis, DiagnosisLabel, FeatureTap, InputTensor, LayerDescriptor, LayerKind,
        Seed, TumorClassifier, DEFAULT_INPUT_SIZE,
    };

    // Models
    pub use tumorlens_models::{load_tumor_cnn, save_tumor_cnn, TumorCnn, TumorCnnConfig};

    // Explainability
    pub use tumorlens_explain::{
        attribute, composite, GradCamConfig, GradientAttributor, HeatmapCompositor,
        OverlayConfig, SaliencyMap,
    };
}

/// Everything, including lower-level pieces.
pub mod all {
    pub use super::prelude::*;

    pub use tumorlens_core::backend;
    pub use tumorlens_core::{find_layer, last_convolutional, ImageShape, TUMOR_THRESHOLD};
    pub use tumorlens_explain::colormap;
    pub use tumorlens_explain::{grad_cam, select_target_layer, BlendMode, OverflowPolicy};
    pub use tumorlens_models::{load_model, save_model, CheckpointMetadata};
}
