//! Model checkpointing.
//!
//! Weights are stored with burn's named MessagePack recorder (`*.mpk`) at full
//! precision. A small JSON sidecar (`*.json`) records the architecture and the
//! config needed to rebuild the module before its weights are loaded.
//!
//! # Example
//!
//! ```rust,ignore
//! use tumorlens_models::checkpoint::{load_tumor_cnn, save_tumor_cnn};
//!
//! save_tumor_cnn(&model, &config, "runs/cnn_model")?;
//! let (model, config) = load_tumor_cnn::<B>("runs/cnn_model", &device)?;
//! ```

use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use serde::{Deserialize, Serialize};

use crate::cnn::{TumorCnn, TumorCnnConfig};
use crate::error::{ModelError, Result};

/// Architecture tag written into metadata for [`TumorCnn`].
pub const TUMOR_CNN_ARCH: &str = "TumorCnn";

fn recorder() -> NamedMpkFileRecorder<FullPrecisionSettings> {
    NamedMpkFileRecorder::<FullPrecisionSettings>::new()
}

fn weights_path(stem: &Path) -> PathBuf {
    stem.with_extension("mpk")
}

fn metadata_path(stem: &Path) -> PathBuf {
    stem.with_extension("json")
}

/// Save module weights to `path` (the `.mpk` extension is applied).
pub fn save_model<B, M>(model: &M, path: impl AsRef<Path>) -> Result<()>
where
    B: Backend,
    M: Module<B>,
{
    let path = weights_path(path.as_ref());
    model
        .clone()
        .save_file(path.clone(), &recorder())
        .map_err(|e| ModelError::Save(format!("{}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "saved model weights");
    Ok(())
}

/// Load weights from `path` into an already-built module.
pub fn load_model<B, M>(model: M, path: impl AsRef<Path>, device: &B::Device) -> Result<M>
where
    B: Backend,
    M: Module<B>,
{
    let path = weights_path(path.as_ref());
    model
        .load_file(path.clone(), &recorder(), device)
        .map_err(|e| ModelError::Load(format!("{}: {e}", path.display())))
}

/// Model checkpoint metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Model architecture name.
    pub arch: String,
    /// Model configuration.
    pub config: TumorCnnConfig,
}

impl CheckpointMetadata {
    /// Create new metadata for a TumorCnn config.
    pub fn new(config: TumorCnnConfig) -> Self {
        Self {
            arch: TUMOR_CNN_ARCH.to_string(),
            config,
        }
    }

    /// Save metadata to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ModelError::Save(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| ModelError::Save(e.to_string()))?;
        Ok(())
    }

    /// Load metadata from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Load(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&json).map_err(|e| ModelError::Load(e.to_string()))
    }
}

/// Save a TumorCnn and its config under `stem` (`stem.mpk` + `stem.json`).
pub fn save_tumor_cnn<B: Backend>(
    model: &TumorCnn<B>,
    config: &TumorCnnConfig,
    stem: impl AsRef<Path>,
) -> Result<()> {
    let stem = stem.as_ref();
    CheckpointMetadata::new(config.clone()).save(metadata_path(stem))?;
    save_model::<B, _>(model, stem)
}

/// Rebuild a TumorCnn from `stem.json` and load `stem.mpk` into it.
pub fn load_tumor_cnn<B: Backend>(
    stem: impl AsRef<Path>,
    device: &B::Device,
) -> Result<(TumorCnn<B>, TumorCnnConfig)> {
    let stem = stem.as_ref();
    let metadata = CheckpointMetadata::load(metadata_path(stem))?;
    if metadata.arch != TUMOR_CNN_ARCH {
        return Err(ModelError::Load(format!(
            "expected architecture {TUMOR_CNN_ARCH}, found {}",
            metadata.arch
        )));
    }

    let model = metadata.config.init::<B>(device)?;
    let model = load_model::<B, _>(model, stem, device)?;
    tracing::info!(path = %weights_path(stem).display(), "loaded TumorCnn checkpoint");
    Ok((model, metadata.config))
}
