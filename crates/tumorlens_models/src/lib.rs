//! # tumorlens_models
//!
//! Reference classifier for tumorlens.
//!
//! ## CNN Models
//! - [`TumorCnn`] - two-stage convolutional binary classifier with a sigmoid head
//!
//! The crate also implements [`tumorlens_core::TumorClassifier`] for its models and
//! provides [`checkpoint`] utilities for saving and restoring trained weights.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checkpoint;
pub mod cnn;
mod error;
mod traits;

pub use checkpoint::{
    load_model, load_tumor_cnn, save_model, save_tumor_cnn, CheckpointMetadata, TUMOR_CNN_ARCH,
};
pub use cnn::*;
pub use error::{ModelError, Result};
