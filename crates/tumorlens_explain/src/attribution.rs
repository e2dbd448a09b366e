//! Grad-CAM attribution.
//!
//! [`GradientAttributor`] runs one forward pass through a classifier with a
//! [`FeatureTap`] on the target layer, back-propagates the target class score
//! to that layer, and reduces activations and gradients to a [`SaliencyMap`]
//! with [`grad_cam`].

use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};
use tumorlens_core::{
    find_layer, last_convolutional, FeatureTap, InputTensor, LayerDescriptor, TumorClassifier,
};

use crate::error::{ExplainError, Result};
use crate::saliency::SaliencyMap;

/// Configuration for Grad-CAM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradCamConfig {
    /// Layer to attribute over. `None` selects the last convolutional layer.
    pub target_layer: Option<String>,
    /// Output column whose score is explained. Column 0 is the tumor probability.
    pub class_index: usize,
    /// Added to the maximum before normalizing.
    pub epsilon: f32,
}

impl Default for GradCamConfig {
    fn default() -> Self {
        Self {
            target_layer: None,
            class_index: 0,
            epsilon: 1e-8,
        }
    }
}

impl GradCamConfig {
    /// Attribute over a specific layer.
    #[must_use]
    pub fn with_target_layer(mut self, layer: impl Into<String>) -> Self {
        self.target_layer = Some(layer.into());
        self
    }

    /// Explain a different output column.
    #[must_use]
    pub fn with_class_index(mut self, class_index: usize) -> Self {
        self.class_index = class_index;
        self
    }

    /// Set the normalization epsilon.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }
}

/// Resolve the layer to attribute over.
///
/// An explicit id must exist and be spatial (convolutional or pooling).
/// Without one, the last [`LayerKind::Convolutional`](tumorlens_core::LayerKind)
/// layer is chosen.
pub fn select_target_layer(
    layers: &[LayerDescriptor],
    explicit: Option<&str>,
) -> Result<LayerDescriptor> {
    let layer = match explicit {
        Some(id) => find_layer(layers, id)
            .ok_or_else(|| ExplainError::LayerNotFound(format!("no layer named '{id}'")))?,
        None => last_convolutional(layers).ok_or_else(|| {
            ExplainError::LayerNotFound(format!(
                "no convolutional layer among {} layers",
                layers.len()
            ))
        })?,
    };

    if !layer.kind.is_spatial() {
        return Err(ExplainError::NonSpatialLayer {
            layer: layer.id.clone(),
            kind: layer.kind,
        });
    }

    Ok(layer.clone())
}

/// Compute a Grad-CAM map from one layer's activations and gradients.
///
/// # Arguments
///
/// * `activations` - Layer output (1, channels, height, width)
/// * `gradients` - Gradient of the class score w.r.t. `activations`, same shape
/// * `epsilon` - Added to the maximum before dividing, must be positive
///
/// # Returns
///
/// Saliency map of shape (height, width): the gradient-weighted channel sum,
/// clipped at zero and divided by its maximum plus `epsilon`.
pub fn grad_cam<B: Backend>(
    activations: Tensor<B, 4>,
    gradients: Tensor<B, 4>,
    epsilon: f32,
) -> Result<SaliencyMap> {
    let [batch, channels, height, width] = activations.dims();
    if gradients.dims() != activations.dims() {
        return Err(ExplainError::InvalidSaliency(format!(
            "gradient shape {:?} does not match activation shape {:?}",
            gradients.dims(),
            activations.dims()
        )));
    }
    if batch != 1 || channels == 0 || height == 0 || width == 0 {
        return Err(ExplainError::InvalidSaliency(format!(
            "expected a single non-empty feature map, got {:?}",
            activations.dims()
        )));
    }
    if !(epsilon > 0.0) {
        return Err(ExplainError::InvalidSaliency(format!(
            "epsilon must be positive, got {epsilon}"
        )));
    }

    // Global average pool the gradients: (1, C, H, W) -> (1, C, 1, 1)
    let weights = gradients.mean_dim(3).mean_dim(2);

    // Weighted sum over channels: (1, C, H, W) -> (1, 1, H, W)
    let cam = (activations * weights).sum_dim(1);

    // Keep positive support only
    let cam = cam.clamp_min(0.0);

    let max: f32 = cam.clone().max().into_scalar().elem();
    let cam = cam / (max + epsilon);

    let values: Vec<f32> = cam
        .into_data()
        .to_vec()
        .map_err(|e| ExplainError::InvalidSaliency(format!("{e:?}")))?;

    SaliencyMap::from_shape_vec(height, width, values)
}

/// Computes class-discriminative saliency maps for a classifier.
///
/// # Example
///
/// ```rust,ignore
/// use tumorlens_explain::{GradCamConfig, GradientAttributor};
///
/// let attributor = GradientAttributor::new(GradCamConfig::default());
/// let saliency = attributor.attribute(&model, &input)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct GradientAttributor {
    config: GradCamConfig,
}

impl GradientAttributor {
    /// Create an attributor from config.
    #[must_use]
    pub fn new(config: GradCamConfig) -> Self {
        Self { config }
    }

    /// Get the config.
    #[must_use]
    pub fn config(&self) -> &GradCamConfig {
        &self.config
    }

    /// Compute the saliency map for one input.
    ///
    /// Runs a single forward pass and a single backward pass that stops at the
    /// target layer. The classifier is only read.
    ///
    /// # Errors
    ///
    /// - [`ExplainError::Core`] if the input does not match the classifier's
    ///   input shape
    /// - [`ExplainError::LayerNotFound`] / [`ExplainError::NonSpatialLayer`] if
    ///   no usable target layer exists
    /// - [`ExplainError::TapNotTriggered`] if the classifier skipped the tap
    /// - [`ExplainError::GradientUnavailable`] if the output does not depend on
    ///   the target layer
    pub fn attribute<B, M>(&self, classifier: &M, input: &InputTensor<B>) -> Result<SaliencyMap>
    where
        B: AutodiffBackend,
        M: TumorClassifier<B>,
    {
        input.ensure_shape(classifier.input_shape())?;

        let layers = classifier.layers();
        let layer = select_target_layer(&layers, self.config.target_layer.as_deref())?;
        let _span = tracing::debug_span!("grad_cam", layer = %layer.id).entered();

        let mut tap = FeatureTap::on(layer.id.clone());
        let output = classifier.forward_tapped(input.inner().clone(), &mut tap);

        let [_, n_outputs] = output.dims();
        let index = self.config.class_index;
        if index >= n_outputs {
            return Err(ExplainError::ClassIndexOutOfRange { index, n_outputs });
        }

        let features = tap.into_captured().ok_or_else(|| ExplainError::TapNotTriggered {
            layer: layer.id.clone(),
        })?;

        let score = output.slice([0..1, index..index + 1]).sum();
        let gradients = {
            let grads = score.backward();
            features.grad(&grads)
        }
        .ok_or_else(|| ExplainError::GradientUnavailable {
            layer: layer.id.clone(),
        })?;

        tracing::debug!(shape = ?features.dims(), "captured feature map");
        let saliency = grad_cam(features.inner(), gradients, self.config.epsilon)?;

        if saliency.is_degenerate() {
            tracing::warn!(layer = %layer.id, "no positive support for the target class; saliency map is all zero");
        }
        tracing::debug!(height = saliency.height(), width = saliency.width(), "computed saliency map");

        Ok(saliency)
    }
}

/// Compute a Grad-CAM saliency map with default settings.
///
/// `target_layer` overrides automatic selection of the last convolutional layer.
pub fn attribute<B, M>(
    classifier: &M,
    input: &InputTensor<B>,
    target_layer: Option<&str>,
) -> Result<SaliencyMap>
where
    B: AutodiffBackend,
    M: TumorClassifier<B>,
{
    let mut config = GradCamConfig::default();
    config.target_layer = target_layer.map(str::to_string);
    GradientAttributor::new(config).attribute(classifier, input)
}
