// ============================================================
// Layer 6 — Run Directory & Checkpoints
// ============================================================
// Owns one run's log directory:
//
//   log/
//     <name>_lr<learning rate>[_<n>]/
//       params.json            ← full run configuration
//       model.json             ← architecture, read back by test mode
//       scalars.csv            ← see metrics.rs
//       model_epoch_1.mpk.gz   ← weights after epoch 1
//       ...
//       model_best_val.mpk.gz  ← weights with the lowest val loss
//
// A fresh directory is created per run: if the natural name is taken,
// `_1`, `_2`, ... is appended, so earlier runs are never overwritten.
//
// Weights use Burn's CompactRecorder (half-precision MessagePack, gzip).
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::ml::model::ModelSpec;

const RECORD_EXTENSION: &str = ".mpk.gz";
const MODEL_SPEC_FILE: &str = "model.json";

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create `<root>/<name>_lr<lr>` (or the first free `_<n>` variant).
    pub fn create_unique(root: &Path, name: &str, learning_rate: f64) -> Result<Self> {
        let base = format!("{name}_lr{learning_rate}");
        let mut dir = root.join(&base);
        let mut n = 1;
        while dir.exists() {
            dir = root.join(format!("{base}_{n}"));
            n += 1;
        }

        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create run directory '{}'", dir.display()))?;
        tracing::debug!("Created run directory '{}'", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Dump the run parameters as pretty JSON to `params.json`.
    pub fn save_params<T: Serialize>(&self, params: &T) -> Result<()> {
        self.save_json("params.json", params)
    }

    /// Record the model architecture in `model.json`.
    pub fn save_model_spec(&self, spec: &ModelSpec) -> Result<()> {
        self.save_json(MODEL_SPEC_FILE, spec)
    }

    fn save_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file_name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    /// Save `model` as `<dir>/<name>.mpk.gz`.
    pub fn save_model<B: Backend, M: Module<B>>(&self, model: &M, name: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;
        tracing::debug!("Saved checkpoint '{}'", path.display());
        Ok(path)
    }
}

/// Load weights saved by `save_model` (or any CompactRecorder record) into `module`.
///
/// Accepts the path with or without its `.mpk.gz` suffix.
pub fn load_module<B: Backend, M: Module<B>>(module: M, path: &Path, device: &B::Device) -> Result<M> {
    let path = strip_record_extension(path);
    let record = CompactRecorder::new()
        .load(path.clone(), device)
        .with_context(|| format!("Cannot load weights from '{}{RECORD_EXTENSION}'", path.display()))?;
    tracing::info!("Loaded weights from '{}{RECORD_EXTENSION}'", path.display());
    Ok(module.load_record(record))
}

/// Read the `model.json` that sits next to `checkpoint`.
pub fn load_model_spec(checkpoint: &Path) -> Result<ModelSpec> {
    let path = checkpoint
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(MODEL_SPEC_FILE);
    let json = fs::read_to_string(&path).with_context(|| {
        format!(
            "Cannot read the model architecture from '{}'. \
             Checkpoints must come from a training run with --log set.",
            path.display()
        )
    })?;
    serde_json::from_str(&json).with_context(|| format!("Malformed '{}'", path.display()))
}

fn strip_record_extension(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    match text.strip_suffix(RECORD_EXTENSION) {
        Some(stem) => PathBuf::from(stem),
        None => path.to_path_buf(),
    }
}
