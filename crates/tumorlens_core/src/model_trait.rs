//! Classifier contract consumed by the attribution code.

use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;

use crate::layer::LayerDescriptor;
use crate::shape::ImageShape;
use crate::tap::FeatureTap;

/// A differentiable binary image classifier.
///
/// Implementors map a `[1, 3, H, W]` input with values in `[0, 1]` to a
/// `[1, n_outputs]` tensor whose column 0 is the tumor probability.
///
/// The classifier is only ever read: attribution runs forward and backward
/// passes through it but never updates its parameters.
pub trait TumorClassifier<B: AutodiffBackend> {
    /// Input shape the classifier accepts, e.g. `(1, 3, 128, 128)`.
    fn input_shape(&self) -> ImageShape;

    /// Ordered layer list, input side first.
    fn layers(&self) -> Vec<LayerDescriptor>;

    /// Forward pass routing every spatial layer output through `tap`.
    ///
    /// Implementations must call [`FeatureTap::intercept`] with each layer's id
    /// as listed by [`TumorClassifier::layers`], and continue with the tensor it
    /// returns.
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor of shape (1, 3, height, width)
    ///
    /// # Returns
    ///
    /// Output tensor of shape (1, n_outputs)
    fn forward_tapped(&self, x: Tensor<B, 4>, tap: &mut FeatureTap<B>) -> Tensor<B, 2>;

    /// Plain forward pass.
    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        self.forward_tapped(x, &mut FeatureTap::passive())
    }
}
