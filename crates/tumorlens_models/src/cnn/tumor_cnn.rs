//! Compact convolutional network for binary tumor classification.
//!
//! Two convolution + max-pool stages feed a small dense head ending in a
//! sigmoid. Layer identifiers follow Keras naming (`conv2d`, `max_pooling2d`,
//! `conv2d_1`, ...), so layer names from Keras-exported models can be passed
//! straight to the attributor.

use burn::nn::{
    conv::{Conv2d, Conv2dConfig},
    pool::{MaxPool2d, MaxPool2dConfig},
    Linear, LinearConfig,
};
use burn::prelude::*;
use burn::tensor::activation::{relu, sigmoid};
use serde::{Deserialize, Serialize};
use tumorlens_core::{FeatureTap, ImageShape, LayerDescriptor, DEFAULT_INPUT_SIZE};

use crate::error::{ModelError, Result};

/// Identifier of the first convolution.
pub const CONV_1: &str = "conv2d";
/// Identifier of the first pooling layer.
pub const POOL_1: &str = "max_pooling2d";
/// Identifier of the second (last) convolution.
pub const CONV_2: &str = "conv2d_1";
/// Identifier of the second pooling layer.
pub const POOL_2: &str = "max_pooling2d_1";
/// Identifier of the flatten step.
pub const FLATTEN: &str = "flatten";
/// Identifier of the hidden dense layer.
pub const DENSE_1: &str = "dense";
/// Identifier of the output layer.
pub const DENSE_2: &str = "dense_1";

/// Configuration for the TumorCnn model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TumorCnnConfig {
    /// Side length of the square input image.
    pub input_size: usize,
    /// Number of input channels.
    pub in_channels: usize,
    /// Number of filters in the first conv layer.
    pub n_filters_1: usize,
    /// Number of filters in the second conv layer.
    pub n_filters_2: usize,
    /// Kernel size for both conv layers.
    pub kernel_size: usize,
    /// Pooling window and stride.
    pub pool_size: usize,
    /// Width of the hidden dense layer.
    pub hidden_size: usize,
}

impl Default for TumorCnnConfig {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
            in_channels: 3,
            n_filters_1: 32,
            n_filters_2: 64,
            kernel_size: 3,
            pool_size: 2,
            hidden_size: 64,
        }
    }
}

impl TumorCnnConfig {
    /// Create a config for the given input size.
    pub fn new(input_size: usize) -> Self {
        Self {
            input_size,
            ..Default::default()
        }
    }

    /// Set the number of filters for both conv layers.
    #[must_use]
    pub fn with_filters(mut self, n_filters_1: usize, n_filters_2: usize) -> Self {
        self.n_filters_1 = n_filters_1;
        self.n_filters_2 = n_filters_2;
        self
    }

    /// Set the hidden dense width.
    #[must_use]
    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    /// Set the kernel size.
    #[must_use]
    pub fn with_kernel_size(mut self, kernel_size: usize) -> Self {
        self.kernel_size = kernel_size;
        self
    }

    /// Spatial side length after each stage: `[conv1, pool1, conv2, pool2]`.
    ///
    /// Returns `None` if the input is too small for the configured kernels.
    pub fn stage_sizes(&self) -> Option<[usize; 4]> {
        if self.kernel_size == 0 || self.pool_size == 0 {
            return None;
        }
        let conv = |side: usize| side.checked_sub(self.kernel_size - 1).filter(|&s| s > 0);
        let pool = |side: usize| Some(side / self.pool_size).filter(|&s| s > 0);

        let conv1 = conv(self.input_size)?;
        let pool1 = pool(conv1)?;
        let conv2 = conv(pool1)?;
        let pool2 = pool(conv2)?;
        Some([conv1, pool1, conv2, pool2])
    }

    /// Number of features entering the dense head.
    pub fn flattened_size(&self) -> Option<usize> {
        self.stage_sizes()
            .map(|[_, _, _, side]| self.n_filters_2 * side * side)
    }

    /// Check the config describes a buildable network.
    pub fn validate(&self) -> Result<()> {
        let widths = [
            self.in_channels,
            self.n_filters_1,
            self.n_filters_2,
            self.hidden_size,
        ];
        if widths.contains(&0) {
            return Err(ModelError::InvalidConfig(
                "channel and hidden sizes must be non-zero".to_string(),
            ));
        }
        if self.stage_sizes().is_none() {
            return Err(ModelError::InvalidConfig(format!(
                "input size {} is too small for kernel {} and pool {}",
                self.input_size, self.kernel_size, self.pool_size
            )));
        }
        Ok(())
    }

    /// Initialize the model.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<TumorCnn<B>> {
        self.validate()?;
        Ok(TumorCnn::new(self, device))
    }
}

/// Convolutional tumor classifier.
///
/// Architecture:
/// - Conv2d(3, 32, kernel=3) -> ReLU
/// - MaxPool2d(2)
/// - Conv2d(32, 64, kernel=3) -> ReLU
/// - MaxPool2d(2)
/// - Flatten
/// - Linear(flattened, 64) -> ReLU
/// - Linear(64, 1) -> Sigmoid
///
/// # Example
///
/// ```rust,ignore
/// use tumorlens_models::TumorCnnConfig;
///
/// let model = TumorCnnConfig::default().init::<Autodiff<NdArray>>(&device)?;
/// let p = model.forward(input.into_inner());
/// // p shape: [1, 1]
/// ```
#[derive(Module, Debug)]
pub struct TumorCnn<B: Backend> {
    input_size: usize,
    conv1: Conv2d<B>,
    pool1: MaxPool2d,
    conv2: Conv2d<B>,
    pool2: MaxPool2d,
    fc1: Linear<B>,
    fc2: Linear<B>,
}

impl<B: Backend> TumorCnn<B> {
    fn new(config: &TumorCnnConfig, device: &B::Device) -> Self {
        let k = config.kernel_size;
        let p = config.pool_size;
        let flattened = config.flattened_size().unwrap_or(config.n_filters_2);

        let conv1 = Conv2dConfig::new([config.in_channels, config.n_filters_1], [k, k]).init(device);
        let conv2 = Conv2dConfig::new([config.n_filters_1, config.n_filters_2], [k, k]).init(device);
        let pool1 = MaxPool2dConfig::new([p, p]).with_strides([p, p]).init();
        let pool2 = MaxPool2dConfig::new([p, p]).with_strides([p, p]).init();
        let fc1 = LinearConfig::new(flattened, config.hidden_size).init(device);
        let fc2 = LinearConfig::new(config.hidden_size, 1).init(device);

        Self {
            input_size: config.input_size,
            conv1,
            pool1,
            conv2,
            pool2,
            fc1,
            fc2,
        }
    }

    /// Shape of the input this model was built for.
    pub fn input_shape(&self) -> ImageShape {
        ImageShape::rgb(self.input_size, self.input_size)
    }

    /// Layer list in forward order.
    pub fn layer_descriptors() -> Vec<LayerDescriptor> {
        vec![
            LayerDescriptor::conv(CONV_1),
            LayerDescriptor::pool(POOL_1),
            LayerDescriptor::conv(CONV_2),
            LayerDescriptor::pool(POOL_2),
            LayerDescriptor::other(FLATTEN),
            LayerDescriptor::dense(DENSE_1),
            LayerDescriptor::dense(DENSE_2),
        ]
    }

    /// Forward pass with every spatial layer output routed through `tap`.
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor of shape (1, channels, size, size)
    ///
    /// # Returns
    ///
    /// Tumor probability of shape (1, 1)
    pub fn forward_tapped(&self, x: Tensor<B, 4>, tap: &mut FeatureTap<B>) -> Tensor<B, 2> {
        let out = tap.intercept(CONV_1, relu(self.conv1.forward(x)));
        let out = tap.intercept(POOL_1, self.pool1.forward(out));
        let out = tap.intercept(CONV_2, relu(self.conv2.forward(out)));
        let out = tap.intercept(POOL_2, self.pool2.forward(out));

        let [batch, channels, height, width] = out.dims();
        let out = out.reshape([batch, channels * height * width]);

        let out = relu(self.fc1.forward(out));
        sigmoid(self.fc2.forward(out))
    }

    /// Forward pass returning the tumor probability.
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        self.forward_tapped(x, &mut FeatureTap::passive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use tumorlens_core::{last_convolutional, LayerKind};

    type TestBackend = NdArray;

    #[test]
    fn test_config_default() {
        let config = TumorCnnConfig::default();
        assert_eq!(config.input_size, 128);
        assert_eq!(config.n_filters_1, 32);
        assert_eq!(config.n_filters_2, 64);
        assert_eq!(config.hidden_size, 64);
    }

    #[test]
    fn test_stage_sizes_default() {
        // 128 -conv-> 126 -pool-> 63 -conv-> 61 -pool-> 30
        let config = TumorCnnConfig::default();
        assert_eq!(config.stage_sizes(), Some([126, 63, 61, 30]));
        assert_eq!(config.flattened_size(), Some(64 * 30 * 30));
    }

    #[test]
    fn test_config_too_small() {
        let config = TumorCnnConfig::new(4);
        assert!(config.stage_sizes().is_none());
        assert!(matches!(
            config.validate(),
            Err(ModelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_builder() {
        let config = TumorCnnConfig::new(32)
            .with_filters(4, 8)
            .with_hidden_size(16)
            .with_kernel_size(5);
        assert_eq!(config.n_filters_1, 4);
        assert_eq!(config.n_filters_2, 8);
        assert_eq!(config.hidden_size, 16);
        assert_eq!(config.kernel_size, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_input_shape_follows_config() {
        let device = Default::default();
        let model = TumorCnnConfig::new(16)
            .with_filters(4, 8)
            .with_hidden_size(8)
            .init::<TestBackend>(&device)
            .unwrap();
        assert_eq!(model.input_shape(), ImageShape::rgb(16, 16));
    }

    #[test]
    fn test_layer_descriptors() {
        let layers = TumorCnn::<TestBackend>::layer_descriptors();
        assert_eq!(layers.len(), 7);
        assert_eq!(layers[4].kind, LayerKind::Other);
        assert_eq!(last_convolutional(&layers).unwrap().id, CONV_2);
    }

    #[test]
    fn test_forward_shape_and_range() {
        let device = Default::default();
        let config = TumorCnnConfig::new(16).with_filters(4, 8).with_hidden_size(8);
        let model = config.init::<TestBackend>(&device).unwrap();

        let x = Tensor::<TestBackend, 4>::ones([1, 3, 16, 16], &device) * 0.5;
        let p = model.forward(x);

        assert_eq!(p.dims(), [1, 1]);
        let p: f32 = p.into_scalar().elem();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_tap_sees_last_conv_resolution() {
        let device = Default::default();
        let config = TumorCnnConfig::new(16).with_filters(4, 8).with_hidden_size(8);
        let model = config.init::<TestBackend>(&device).unwrap();

        let mut tap = FeatureTap::on(CONV_2);
        let x = Tensor::<TestBackend, 4>::zeros([1, 3, 16, 16], &device);
        let _ = model.forward_tapped(x, &mut tap);

        // 16 -conv-> 14 -pool-> 7 -conv-> 5
        assert_eq!(tap.captured().unwrap().dims(), [1, 8, 5, 5]);
    }
}
