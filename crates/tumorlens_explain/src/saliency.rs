//! Normalized saliency grids.

use ndarray::Array2;

use crate::error::{ExplainError, Result};

/// A 2D importance map with every value in `[0, 1]`.
///
/// Rows index height and columns index width, at the resolution of the layer
/// the map was computed from. Resampling to image resolution happens at
/// render time through [`SaliencyMap::resize_bilinear`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaliencyMap {
    values: Array2<f32>,
}

impl SaliencyMap {
    /// Wrap a grid of values.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::InvalidSaliency`] if the grid is empty or holds
    /// a value outside `[0, 1]` (NaN included).
    pub fn new(values: Array2<f32>) -> Result<Self> {
        if values.is_empty() {
            return Err(ExplainError::InvalidSaliency(format!(
                "empty grid {:?}",
                values.dim()
            )));
        }
        if let Some(bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(ExplainError::InvalidSaliency(format!(
                "value {bad} outside [0, 1]"
            )));
        }
        Ok(Self { values })
    }

    /// Build from row-major values.
    pub fn from_shape_vec(height: usize, width: usize, values: Vec<f32>) -> Result<Self> {
        let values = Array2::from_shape_vec((height, width), values)
            .map_err(|e| ExplainError::InvalidSaliency(e.to_string()))?;
        Self::new(values)
    }

    /// An all-zero map.
    #[must_use]
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            values: Array2::zeros((height, width)),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    /// `(height, width)`.
    #[must_use]
    pub fn dims(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Borrow the grid.
    #[must_use]
    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    /// Consume the map and return the grid.
    #[must_use]
    pub fn into_values(self) -> Array2<f32> {
        self.values
    }

    /// Value at `(row, col)`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.values.get((row, col)).copied()
    }

    /// Largest value.
    #[must_use]
    pub fn max(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }

    /// Whether no location received positive support.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    /// Bilinearly resample to `(height, width)`.
    ///
    /// Sample positions use pixel centers, `src = (dst + 0.5) * scale - 0.5`,
    /// with coordinates clamped at the borders.
    #[must_use]
    pub fn resize_bilinear(&self, height: usize, width: usize) -> Array2<f32> {
        let (src_h, src_w) = self.dims();
        if src_h == 0 || src_w == 0 {
            return Array2::zeros((height, width));
        }
        let rows = sample_positions(src_h, height);
        let cols = sample_positions(src_w, width);

        Array2::from_shape_fn((height, width), |(y, x)| {
            let (y0, y1, fy) = rows[y];
            let (x0, x1, fx) = cols[x];
            let top = self.values[(y0, x0)] * (1.0 - fx) + self.values[(y0, x1)] * fx;
            let bottom = self.values[(y1, x0)] * (1.0 - fx) + self.values[(y1, x1)] * fx;
            (top * (1.0 - fy) + bottom * fy).clamp(0.0, 1.0)
        })
    }
}

/// For each destination index: the two source neighbours and the weight of the second.
fn sample_positions(src_len: usize, dst_len: usize) -> Vec<(usize, usize, f32)> {
    let scale = src_len as f32 / dst_len.max(1) as f32;
    let last = src_len - 1;
    (0..dst_len)
        .map(|dst| {
            let src = ((dst as f32 + 0.5) * scale - 0.5).max(0.0);
            let i0 = (src.floor() as usize).min(last);
            let i1 = (i0 + 1).min(last);
            let frac = if i1 == i0 { 0.0 } else { src - i0 as f32 };
            (i0, i1, frac)
        })
        .collect()
}
