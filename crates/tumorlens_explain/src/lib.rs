//! # tumorlens_explain
//!
//! Visual explanations for tumorlens classifiers.
//!
//! This crate provides:
//! - Grad-CAM attribution over a tapped convolutional layer ([`GradientAttributor`])
//! - Normalized saliency grids with bilinear resampling ([`SaliencyMap`])
//! - Jet-colored heatmap overlays written to disk ([`HeatmapCompositor`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use tumorlens_explain::{attribute, composite};
//!
//! let saliency = attribute(&model, &input, None)?;
//! composite(&saliency, "scan.png", "gradcam_output.png")?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod attribution;
pub mod colormap;
mod error;
mod overlay;
mod saliency;

pub use attribution::{
    attribute, grad_cam, select_target_layer, GradCamConfig, GradientAttributor,
};
pub use error::{ExplainError, Result};
pub use overlay::{composite, BlendMode, HeatmapCompositor, OverflowPolicy, OverlayConfig};
pub use saliency::SaliencyMap;
