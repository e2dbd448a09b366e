//! Feature tapping for intermediate layers.

use burn::prelude::*;

/// Captures the output of one named layer during a forward pass.
///
/// Classifiers route every spatial layer output through [`FeatureTap::intercept`].
/// When the layer id matches the tap's target, the activation is detached from
/// the graph that produced it and re-registered as a gradient-tracked leaf. The
/// rest of the forward pass continues from that leaf, so a backward pass from
/// the output stops at the tapped layer and the leaf's gradient can be read back
/// with `Tensor::grad`.
///
/// A passive tap (no target) forwards every activation untouched.
#[derive(Debug, Clone)]
pub struct FeatureTap<B: Backend> {
    target: Option<String>,
    captured: Option<Tensor<B, 4>>,
}

impl<B: Backend> FeatureTap<B> {
    /// A tap that captures nothing.
    pub fn passive() -> Self {
        Self {
            target: None,
            captured: None,
        }
    }

    /// A tap that captures the output of `layer`.
    pub fn on(layer: impl Into<String>) -> Self {
        Self {
            target: Some(layer.into()),
            captured: None,
        }
    }

    /// The layer this tap is attached to.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Pass a layer output through the tap.
    ///
    /// Returns the tensor the caller must continue the forward pass with.
    pub fn intercept(&mut self, layer: &str, activation: Tensor<B, 4>) -> Tensor<B, 4> {
        if self.target.as_deref() != Some(layer) {
            return activation;
        }

        let leaf = activation.detach().require_grad();
        self.captured = Some(leaf.clone());
        leaf
    }

    /// Whether the target layer has been seen.
    pub fn is_triggered(&self) -> bool {
        self.captured.is_some()
    }

    /// The captured activation, if the target layer has been seen.
    pub fn captured(&self) -> Option<&Tensor<B, 4>> {
        self.captured.as_ref()
    }

    /// Consume the tap and return the captured activation.
    pub fn into_captured(self) -> Option<Tensor<B, 4>> {
        self.captured
    }
}

impl<B: Backend> Default for FeatureTap<B> {
    fn default() -> Self {
        Self::passive()
    }
}
