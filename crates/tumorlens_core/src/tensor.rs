//! Classifier input tensors.

use std::path::Path;

use burn::prelude::*;
use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::error::{CoreError, Result};
use crate::shape::ImageShape;

/// Side length of the square input the reference classifier was trained on.
pub const DEFAULT_INPUT_SIZE: usize = 128;

/// A preprocessed single-image input for a classifier.
///
/// Holds a `[1, 3, H, W]` float tensor with every value in `[0, 1]`. The
/// channel-first layout follows burn's `Conv2d` convention; conceptually the
/// tensor is one `H x W` RGB image.
///
/// # Example
///
/// ```rust,ignore
/// use tumorlens_core::{InputTensor, DEFAULT_INPUT_SIZE};
///
/// let input = InputTensor::<B>::from_image_path("scan.png", DEFAULT_INPUT_SIZE, &device)?;
/// assert_eq!(input.shape().height(), 128);
/// ```
#[derive(Debug, Clone)]
pub struct InputTensor<B: Backend> {
    inner: Tensor<B, 4>,
    shape: ImageShape,
}

impl<B: Backend> InputTensor<B> {
    /// Wrap an existing tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor is not a single 3-channel image or if any
    /// value lies outside `[0, 1]`.
    pub fn new(tensor: Tensor<B, 4>) -> Result<Self> {
        let shape = ImageShape::from(tensor.dims());
        if shape.batch() != 1 || shape.channels() != 3 || shape.is_empty() {
            return Err(CoreError::InvalidShape {
                expected: "(N=1, C=3, H>0, W>0)".to_string(),
                got: shape.to_string(),
            });
        }

        let min: f32 = tensor.clone().min().into_scalar().elem();
        let max: f32 = tensor.clone().max().into_scalar().elem();
        // Written this way so NaN fails too.
        if !(min >= 0.0 && max <= 1.0) {
            return Err(CoreError::ValueRange { min, max });
        }

        Ok(Self {
            inner: tensor,
            shape,
        })
    }

    /// Resize an RGB image to `size x size` and scale it to `[0, 1]`.
    ///
    /// Resizing uses nearest-neighbour sampling.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero.
    pub fn from_rgb(image: &RgbImage, size: usize, device: &B::Device) -> Result<Self> {
        if size == 0 || image.width() == 0 || image.height() == 0 {
            return Err(CoreError::InvalidShape {
                expected: "non-empty image and target size".to_string(),
                got: format!("{}x{} -> {size}", image.width(), image.height()),
            });
        }

        let side = size as u32;
        let resized = if image.dimensions() == (side, side) {
            image.clone()
        } else {
            imageops::resize(image, side, side, FilterType::Nearest)
        };

        let plane = size * size;
        let mut values = vec![0.0f32; 3 * plane];
        for (x, y, pixel) in resized.enumerate_pixels() {
            let offset = y as usize * size + x as usize;
            for (channel, &level) in pixel.0.iter().enumerate() {
                values[channel * plane + offset] = f32::from(level) / 255.0;
            }
        }

        let shape = ImageShape::rgb(size, size);
        let tensor = Tensor::from_data(TensorData::new(values, shape.as_array()), device);
        Ok(Self {
            inner: tensor,
            shape,
        })
    }

    /// Load an image from disk and preprocess it with [`InputTensor::from_rgb`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ImageLoad`] if the file cannot be read or decoded.
    pub fn from_image_path(
        path: impl AsRef<Path>,
        size: usize,
        device: &B::Device,
    ) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| CoreError::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();

        tracing::debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            size,
            "preprocessing input image"
        );

        Self::from_rgb(&image, size, device)
    }

    /// Get the shape metadata.
    #[must_use]
    pub const fn shape(&self) -> ImageShape {
        self.shape
    }

    /// Check that this input has the shape a classifier declares.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidShape`] on a mismatch.
    pub fn ensure_shape(&self, expected: ImageShape) -> Result<()> {
        if self.shape != expected {
            return Err(CoreError::InvalidShape {
                expected: expected.to_string(),
                got: self.shape.to_string(),
            });
        }
        Ok(())
    }

    /// Get a reference to the underlying tensor.
    #[must_use]
    pub const fn inner(&self) -> &Tensor<B, 4> {
        &self.inner
    }

    /// Consume self and return the underlying tensor.
    #[must_use]
    pub fn into_inner(self) -> Tensor<B, 4> {
        self.inner
    }

    /// Get the device the tensor is on.
    pub fn device(&self) -> B::Device {
        self.inner.device()
    }
}
