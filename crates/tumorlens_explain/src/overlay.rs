//! Heatmap overlay rendering.
//!
//! [`HeatmapCompositor`] turns a [`SaliencyMap`] into a jet-colored heatmap at
//! the source image's resolution and blends it onto the image.

use std::path::Path;

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::colormap::{jet_lut, quantize};
use crate::error::{ExplainError, Result};
use crate::saliency::SaliencyMap;

/// How the heatmap is combined with the source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// `heat * alpha + source`
    #[default]
    Additive,
    /// `heat * alpha + source * (1 - alpha)`
    Mix,
}

/// What happens to blended channel values above 255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Clamp to 255.
    #[default]
    Saturate,
    /// Keep the low 8 bits of the truncated value (modular u8 arithmetic).
    Wrap,
}

impl OverflowPolicy {
    /// Convert a non-negative blended channel value to u8.
    ///
    /// Fractions are truncated under both policies.
    #[must_use]
    pub fn apply(self, value: f32) -> u8 {
        match self {
            // float -> int casts saturate
            Self::Saturate => value as u8,
            Self::Wrap => (value as u32 % 256) as u8,
        }
    }
}

impl std::str::FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "saturate" | "clamp" => Ok(Self::Saturate),
            "wrap" => Ok(Self::Wrap),
            other => Err(format!("unknown overflow policy '{other}'")),
        }
    }
}

/// Configuration for heatmap overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Heatmap weight.
    pub alpha: f32,
    /// Blend formula.
    pub blend: BlendMode,
    /// Overflow handling for blended values.
    pub overflow: OverflowPolicy,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            alpha: 0.4,
            blend: BlendMode::Additive,
            overflow: OverflowPolicy::Saturate,
        }
    }
}

impl OverlayConfig {
    /// Set the heatmap weight.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the blend formula.
    #[must_use]
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// Set the overflow policy.
    #[must_use]
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }
}

/// Renders saliency maps onto source images.
///
/// # Example
///
/// ```rust,ignore
/// use tumorlens_explain::{HeatmapCompositor, OverlayConfig};
///
/// let compositor = HeatmapCompositor::new(OverlayConfig::default());
/// compositor.composite(&saliency, "scan.png", "gradcam_output.png")?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeatmapCompositor {
    config: OverlayConfig,
}

impl HeatmapCompositor {
    /// Create a compositor from config.
    #[must_use]
    pub fn new(config: OverlayConfig) -> Self {
        Self { config }
    }

    /// Get the config.
    #[must_use]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Colorize `saliency` at `source` resolution and blend it onto `source`.
    ///
    /// The returned image always has the dimensions of `source`.
    #[must_use]
    pub fn render(&self, saliency: &SaliencyMap, source: &RgbImage) -> RgbImage {
        let (width, height) = source.dimensions();
        let field = saliency.resize_bilinear(height as usize, width as usize);
        let lut = jet_lut();

        let alpha = self.config.alpha.max(0.0);
        let source_weight = match self.config.blend {
            BlendMode::Additive => 1.0,
            BlendMode::Mix => (1.0 - alpha).max(0.0),
        };
        let overflow = self.config.overflow;

        RgbImage::from_fn(width, height, |x, y| {
            let Rgb(heat) = lut[quantize(field[(y as usize, x as usize)]) as usize];
            let Rgb(base) = *source.get_pixel(x, y);
            let mut out = [0u8; 3];
            for c in 0..3 {
                let v = f32::from(heat[c]) * alpha + f32::from(base[c]) * source_weight;
                out[c] = overflow.apply(v);
            }
            Rgb(out)
        })
    }

    /// Load `source_path`, render the overlay and write it to `destination_path`.
    ///
    /// The output format follows the destination extension. Nothing is written
    /// if the source cannot be read.
    ///
    /// # Errors
    ///
    /// - [`ExplainError::SourceImageUnreadable`] if the source is missing or
    ///   cannot be decoded
    /// - [`ExplainError::WriteFailure`] if the destination cannot be written
    pub fn composite(
        &self,
        saliency: &SaliencyMap,
        source_path: impl AsRef<Path>,
        destination_path: impl AsRef<Path>,
    ) -> Result<()> {
        let source_path = source_path.as_ref();
        let destination_path = destination_path.as_ref();

        let source = image::open(source_path)
            .map_err(|source| ExplainError::SourceImageUnreadable {
                path: source_path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        tracing::debug!(
            path = %source_path.display(),
            width = source.width(),
            height = source.height(),
            saliency = ?saliency.dims(),
            "rendering overlay"
        );

        let overlay = self.render(saliency, &source);
        overlay
            .save(destination_path)
            .map_err(|source| ExplainError::WriteFailure {
                path: destination_path.to_path_buf(),
                source,
            })?;

        tracing::info!(path = %destination_path.display(), "wrote Grad-CAM overlay");
        Ok(())
    }
}

/// Overlay `saliency` onto the image at `source_path` with default settings.
pub fn composite(
    saliency: &SaliencyMap,
    source_path: impl AsRef<Path>,
    destination_path: impl AsRef<Path>,
) -> Result<()> {
    HeatmapCompositor::default().composite(saliency, source_path, destination_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(color))
    }

    #[test]
    fn test_overlay_config_default() {
        let config = OverlayConfig::default();
        assert_eq!(config.alpha, 0.4);
        assert_eq!(config.blend, BlendMode::Additive);
        assert_eq!(config.overflow, OverflowPolicy::Saturate);
    }

    #[test]
    fn test_overlay_config_serde() {
        let config: OverlayConfig =
            serde_json::from_str(r#"{"alpha":0.5,"overflow":"wrap"}"#).unwrap();
        assert_eq!(config.alpha, 0.5);
        assert_eq!(config.blend, BlendMode::Additive);
        assert_eq!(config.overflow, OverflowPolicy::Wrap);
    }

    #[test]
    fn test_overflow_policy() {
        assert_eq!(OverflowPolicy::Saturate.apply(81.9), 81);
        assert_eq!(OverflowPolicy::Saturate.apply(300.0), 255);
        assert_eq!(OverflowPolicy::Wrap.apply(300.0), 44);
        assert_eq!(OverflowPolicy::Wrap.apply(255.5), 255);
        assert_eq!("WRAP".parse::<OverflowPolicy>(), Ok(OverflowPolicy::Wrap));
        assert!("bogus".parse::<OverflowPolicy>().is_err());
    }

    #[test]
    fn test_render_keeps_source_size() {
        let compositor = HeatmapCompositor::default();
        let saliency = SaliencyMap::new(array![[0.0, 1.0], [0.5, 0.25]]).unwrap();
        let source = solid(37, 23, [50, 50, 50]);

        let out = compositor.render(&saliency, &source);
        assert_eq!(out.dimensions(), (37, 23));
    }

    #[test]
    fn test_render_degenerate_adds_zero_color() {
        // jet(0) = (0, 0, 128); 128 * 0.4 = 51.2
        let compositor = HeatmapCompositor::default();
        let out = compositor.render(&SaliencyMap::zeros(4, 4), &solid(8, 6, [10, 20, 30]));
        assert!(out.pixels().all(|p| *p == Rgb([10, 20, 81])));
    }

    #[test]
    fn test_render_saturate_vs_wrap() {
        // jet(255) = (128, 0, 0); 240 + 51.2 overflows the red channel
        let saliency = SaliencyMap::new(array![[1.0]]).unwrap();
        let source = solid(2, 2, [240, 0, 0]);

        let saturated = HeatmapCompositor::default().render(&saliency, &source);
        assert_eq!(saturated.get_pixel(0, 0).0[0], 255);

        let wrapped = HeatmapCompositor::new(
            OverlayConfig::default().with_overflow(OverflowPolicy::Wrap),
        )
        .render(&saliency, &source);
        assert_eq!(wrapped.get_pixel(0, 0).0[0], 35);
    }

    #[test]
    fn test_render_mix_mode() {
        // 0.5 * (0, 0, 128) + 0.5 * (100, 100, 100)
        let compositor = HeatmapCompositor::new(
            OverlayConfig::default()
                .with_alpha(0.5)
                .with_blend(BlendMode::Mix),
        );
        let out = compositor.render(&SaliencyMap::zeros(1, 1), &solid(3, 3, [100, 100, 100]));
        assert_eq!(*out.get_pixel(1, 1), Rgb([50, 50, 114]));
    }

    #[test]
    fn test_composite_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("scan.png");
        let destination = dir.path().join("overlay.png");
        solid(20, 12, [10, 20, 30]).save(&source_path).unwrap();

        composite(&SaliencyMap::zeros(3, 3), &source_path, &destination).unwrap();

        let written = image::open(&destination).unwrap().to_rgb8();
        assert_eq!(written.dimensions(), (20, 12));
        assert_eq!(*written.get_pixel(5, 5), Rgb([10, 20, 81]));
    }

    #[test]
    fn test_composite_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("overlay.png");

        let result = composite(
            &SaliencyMap::zeros(2, 2),
            dir.path().join("missing.png"),
            &destination,
        );
        assert!(matches!(result, Err(ExplainError::SourceImageUnreadable { .. })));
        assert!(!destination.exists());
    }

    #[test]
    fn test_composite_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("scan.png");
        solid(4, 4, [0, 0, 0]).save(&source_path).unwrap();

        let result = composite(
            &SaliencyMap::zeros(2, 2),
            &source_path,
            dir.path().join("no_such_dir").join("overlay.png"),
        );
        assert!(matches!(result, Err(ExplainError::WriteFailure { .. })));
    }
}
