//! tumorlens CLI: classify a brain MRI scan and render a Grad-CAM overlay.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;
use tumorlens_core::{
    classify, last_convolutional, Diagnosis, InputTensor, Seed, TumorClassifier,
};
use tumorlens_explain::{
    select_target_layer, GradCamConfig, GradientAttributor, HeatmapCompositor, OverflowPolicy,
    OverlayConfig,
};
use tumorlens_models::{load_tumor_cnn, TumorCnn, TumorCnnConfig};

/// Backend type for inference. Grad-CAM needs autodiff.
type InferBackend = Autodiff<NdArray>;

#[derive(Parser)]
#[command(name = "tumorlens")]
#[command(author, version)]
#[command(about = "Brain tumor classification with Grad-CAM heatmap overlays")]
#[command(long_about = "tumorlens: classify a brain MRI scan and explain the prediction.

EXAMPLES:
  # Classify a scan with trained weights and write the overlay
  tumorlens predict --image scan.png --checkpoint runs/cnn_model

  # Attribute over the first convolution and print JSON
  tumorlens predict --image scan.png --checkpoint runs/cnn_model --layer conv2d --json

  # List the classifier's layers
  tumorlens layers")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify an image and write a Grad-CAM overlay
    Predict {
        /// Input image (PNG, JPEG or BMP)
        #[arg(long, value_name = "PATH")]
        image: PathBuf,

        /// Checkpoint stem written by the trainer (`<stem>.mpk` + `<stem>.json`)
        #[arg(long, value_name = "PATH")]
        checkpoint: Option<PathBuf>,

        /// Overlay destination
        #[arg(long, default_value = "gradcam_output.png", value_name = "PATH")]
        output: PathBuf,

        /// Layer to attribute over (default: last convolution)
        #[arg(long, value_name = "ID")]
        layer: Option<String>,

        /// Heatmap weight in the blend
        #[arg(long, value_name = "ALPHA")]
        alpha: Option<f32>,

        /// Overflow handling: saturate or wrap
        #[arg(long, value_name = "POLICY")]
        overflow: Option<OverflowPolicy>,

        /// JSON file with `gradcam` and `overlay` sections
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long, default_value = "false")]
        json: bool,

        /// Random seed for the untrained fallback model
        #[arg(long, default_value = "42", value_name = "SEED")]
        seed: u64,
    },
    /// List the classifier's layers
    Layers,
}

/// Settings that can be loaded with `--config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct RunConfig {
    gradcam: GradCamConfig,
    overlay: OverlayConfig,
}

impl RunConfig {
    fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config '{}'", path.display()))
    }

    /// Apply command-line overrides on top of file values.
    fn with_overrides(
        mut self,
        layer: Option<String>,
        alpha: Option<f32>,
        overflow: Option<OverflowPolicy>,
    ) -> Self {
        if let Some(layer) = layer {
            self.gradcam.target_layer = Some(layer);
        }
        if let Some(alpha) = alpha {
            self.overlay.alpha = alpha;
        }
        if let Some(overflow) = overflow {
            self.overlay.overflow = overflow;
        }
        self
    }
}

/// What `predict --json` prints.
#[derive(Debug, Serialize)]
struct PredictReport {
    image: PathBuf,
    diagnosis: Diagnosis,
    layer: String,
    overlay: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    match cli.command {
        Commands::Predict {
            image,
            checkpoint,
            output,
            layer,
            alpha,
            overflow,
            config,
            json,
            seed,
        } => {
            let run_config = match config {
                Some(path) => RunConfig::load(&path)?,
                None => RunConfig::default(),
            }
            .with_overrides(layer, alpha, overflow);
            handle_predict(image, checkpoint, output, run_config, json, Seed::new(seed))
        }
        Commands::Layers => handle_layers(),
    }
}

fn load_classifier(
    checkpoint: Option<&Path>,
    seed: Seed,
    device: &<InferBackend as burn::prelude::Backend>::Device,
) -> Result<(TumorCnn<InferBackend>, TumorCnnConfig)> {
    match checkpoint {
        Some(stem) => load_tumor_cnn::<InferBackend>(stem, device)
            .with_context(|| format!("Failed to load checkpoint '{}'", stem.display())),
        None => {
            tracing::warn!(
                seed = seed.value(),
                "no --checkpoint given; using an untrained model, predictions are not meaningful"
            );
            seed.apply::<InferBackend>();
            let config = TumorCnnConfig::default();
            let model = config
                .init::<InferBackend>(device)
                .context("Failed to build model")?;
            Ok((model, config))
        }
    }
}

fn handle_predict(
    image: PathBuf,
    checkpoint: Option<PathBuf>,
    output: PathBuf,
    config: RunConfig,
    json: bool,
    seed: Seed,
) -> Result<()> {
    let device = Default::default();
    let (model, model_config) = load_classifier(checkpoint.as_deref(), seed, &device)?;

    let input =
        InputTensor::<InferBackend>::from_image_path(&image, model_config.input_size, &device)
            .with_context(|| format!("Failed to load image '{}'", image.display()))?;

    let diagnosis = classify(&model, &input).context("Classification failed")?;
    tracing::info!(probability = diagnosis.probability, label = %diagnosis.label, "classified");

    let layer = select_target_layer(
        &TumorClassifier::layers(&model),
        config.gradcam.target_layer.as_deref(),
    )
    .context("Invalid Grad-CAM target layer")?
    .id;

    let attributor = GradientAttributor::new(config.gradcam);
    let saliency = attributor
        .attribute(&model, &input)
        .context("Grad-CAM attribution failed")?;

    HeatmapCompositor::new(config.overlay)
        .composite(&saliency, &image, &output)
        .context("Failed to write overlay")?;

    if json {
        let report = PredictReport {
            image,
            diagnosis,
            layer,
            overlay: output,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Prediction: {}", diagnosis.label);
        println!("Confidence: {:.2}%", diagnosis.confidence * 100.0);
        println!("Layer:      {layer}");
        println!("Overlay:    {}", output.display());
    }

    Ok(())
}

fn handle_layers() -> Result<()> {
    let layers = TumorCnn::<InferBackend>::layer_descriptors();
    let target = last_convolutional(&layers).map(|l| l.id.clone());

    println!("TumorCnn layers:");
    println!("─────────────────────────────────────────");
    for layer in &layers {
        let marker = if Some(&layer.id) == target.as_ref() {
            "  <- default Grad-CAM target"
        } else {
            ""
        };
        println!("  {:<20}{:<16}{marker}", layer.id, layer.kind.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tumorlens_models::save_tumor_cnn;

    #[test]
    fn test_parse_predict() {
        let cli = Cli::try_parse_from([
            "tumorlens",
            "-v",
            "predict",
            "--image",
            "scan.png",
            "--overflow",
            "wrap",
            "--alpha",
            "0.5",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Predict {
                image,
                output,
                overflow,
                alpha,
                seed,
                ..
            } => {
                assert_eq!(image, PathBuf::from("scan.png"));
                assert_eq!(output, PathBuf::from("gradcam_output.png"));
                assert_eq!(overflow, Some(OverflowPolicy::Wrap));
                assert_eq!(alpha, Some(0.5));
                assert_eq!(seed, 42);
            }
            Commands::Layers => panic!("expected predict"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_overflow() {
        let result = Cli::try_parse_from([
            "tumorlens",
            "predict",
            "--image",
            "scan.png",
            "--overflow",
            "explode",
        ]);
        assert!(result.is_err());
    }

    fn write_scan(path: &Path, width: u32, height: u32) {
        image::RgbImage::from_fn(width, height, |x, y| {
            let v = ((x * 7 + y * 13) % 256) as u8;
            image::Rgb([v, v / 2, 255 - v])
        })
        .save(path)
        .unwrap();
    }

    fn small_checkpoint(dir: &Path) -> PathBuf {
        let device = Default::default();
        let config = TumorCnnConfig::new(16).with_filters(4, 8).with_hidden_size(8);
        let model = config.init::<InferBackend>(&device).unwrap();
        let stem = dir.join("cnn_model");
        save_tumor_cnn(&model, &config, &stem).unwrap();
        stem
    }

    #[test]
    fn test_predict_writes_overlay_at_scan_size() {
        let dir = tempfile::tempdir().unwrap();
        let scan = dir.path().join("scan.png");
        let output = dir.path().join("gradcam_output.png");
        write_scan(&scan, 40, 30);
        let checkpoint = small_checkpoint(dir.path());

        handle_predict(
            scan,
            Some(checkpoint),
            output.clone(),
            RunConfig::default(),
            true,
            Seed::default(),
        )
        .unwrap();

        let written = image::open(&output).unwrap().to_rgb8();
        assert_eq!(written.dimensions(), (40, 30));
    }

    #[test]
    fn test_predict_rejects_dense_layer() {
        let dir = tempfile::tempdir().unwrap();
        let scan = dir.path().join("scan.png");
        let output = dir.path().join("overlay.png");
        write_scan(&scan, 20, 20);
        let checkpoint = small_checkpoint(dir.path());

        let config = RunConfig::default().with_overrides(Some("dense".to_string()), None, None);
        let result = handle_predict(
            scan,
            Some(checkpoint),
            output.clone(),
            config,
            false,
            Seed::default(),
        );

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_run_config_overrides() {
        let config: RunConfig =
            serde_json::from_str(r#"{"overlay":{"alpha":0.7},"gradcam":{"target_layer":"conv2d"}}"#)
                .unwrap();
        assert_eq!(config.overlay.alpha, 0.7);

        let config = config.with_overrides(Some("conv2d_1".to_string()), None, Some(OverflowPolicy::Wrap));
        assert_eq!(config.gradcam.target_layer.as_deref(), Some("conv2d_1"));
        assert_eq!(config.overlay.alpha, 0.7);
        assert_eq!(config.overlay.overflow, OverflowPolicy::Wrap);
    }
}
