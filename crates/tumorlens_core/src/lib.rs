//! # tumorlens_core
//!
//! Core types and traits for tumorlens.
//!
//! This crate provides:
//! - [`InputTensor`] for preprocessed classifier inputs
//! - [`ImageShape`] for image tensor shape metadata
//! - [`LayerDescriptor`] and [`LayerKind`] for layer introspection
//! - [`TumorClassifier`], the contract a classifier must meet to be explained
//! - [`FeatureTap`] for capturing an intermediate layer during a forward pass
//! - [`Diagnosis`] for interpreting the tumor probability
//! - [`Seed`] for deterministic model initialization
//!
//! ## Shape Convention
//!
//! Image tensors follow burn's channel-first convention `(N, C, H, W)`:
//! - `N`: Batch size (1 per inference request)
//! - `C`: Channels (3 for RGB input, filter count for feature maps)
//! - `H`, `W`: Spatial size
//!
//! ## Example
//!
//! ```rust,ignore
//! use tumorlens_core::{classify, InputTensor, DEFAULT_INPUT_SIZE};
//!
//! let input = InputTensor::from_image_path("scan.png", DEFAULT_INPUT_SIZE, &device)?;
//! let diagnosis = classify(&model, &input)?;
//! println!("{diagnosis}");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod diagnosis;
mod error;
mod layer;
mod model_trait;
mod seed;
mod shape;
mod tap;
mod tensor;

pub use diagnosis::{classify, Diagnosis, DiagnosisLabel, TUMOR_THRESHOLD};
pub use error::{CoreError, Result};
pub use layer::{find_layer, last_convolutional, LayerDescriptor, LayerKind};
pub use model_trait::TumorClassifier;
pub use seed::Seed;
pub use shape::ImageShape;
pub use tap::FeatureTap;
pub use tensor::{InputTensor, DEFAULT_INPUT_SIZE};

/// Backend type aliases for convenience
pub mod backend {
    #[cfg(feature = "backend-ndarray")]
    pub use burn_ndarray::NdArray;

    #[cfg(feature = "backend-wgpu")]
    pub use burn_wgpu::Wgpu;

    #[cfg(feature = "backend-tch")]
    pub use burn_tch::LibTorch;
}
