// ============================================================
// Layer 6 — Feature & Score Store
// ============================================================
// The encoding pre-pass and the train/test stage are joined by an
// explicit artifact, EncodedFeatures: stage 1 returns one per split,
// stage 2 loads them. Nothing downstream rebuilds file names.
//
// Tensors are stored as full-precision named MessagePack records.
// `.mpk` is appended to the given path unless it is already there:
// `encoded_features_train` is written as `encoded_features_train.mpk`
// and `scores.v2` as `scores.v2.mpk`. The recorder itself would
// replace the `.v2`, so it is always handed the full name.

use anyhow::{anyhow, bail, Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};
use std::path::{Path, PathBuf};

use crate::data::dataset::FeatureMatrix;
use crate::domain::run::Split;

type TensorRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

const TENSOR_EXTENSION: &str = "mpk";

/// The file a tensor saved at `path` ends up in.
pub fn record_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == TENSOR_EXTENSION) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(TENSOR_EXTENSION);
    PathBuf::from(name)
}

/// Persist a `[rows, cols]` tensor; returns the file written.
pub fn save_tensor<B: Backend>(tensor: Tensor<B, 2>, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create '{}'", parent.display()))?;
    }
    let [rows, cols] = tensor.dims();
    let file = record_path(path);
    TensorRecorder::new()
        .record(tensor, file.clone())
        .with_context(|| format!("Cannot write tensor to '{}'", file.display()))?;

    tracing::info!("Saved [{rows}, {cols}] tensor to '{}'", file.display());
    Ok(file)
}

pub fn load_tensor<B: Backend>(path: &Path, device: &B::Device) -> Result<Tensor<B, 2>> {
    let file = record_path(path);
    TensorRecorder::new()
        .load(file.clone(), device)
        .with_context(|| format!("Cannot read tensor from '{}'", file.display()))
}

/// Copy a `[rows, dim]` tensor to the host.
pub fn to_matrix<B: Backend>(tensor: Tensor<B, 2>) -> Result<FeatureMatrix> {
    let [rows, dim] = tensor.dims();
    let values = tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read feature values: {e:?}"))?;
    FeatureMatrix::new(rows, dim, values)
}

// ─── EncodedFeatures ──────────────────────────────────────────────────────────
/// Handle to the encoded feature matrix of one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFeatures {
    pub split: Split,
    path:      PathBuf,
}

impl EncodedFeatures {
    /// Where the encoder writes (and the sequence stage reads) `split`.
    pub fn locate(encode_dir: &Path, split: Split) -> Self {
        let path = encode_dir.join(format!("encoded_features_{}", split.as_str()));
        Self { split, path }
    }

    /// The file on disk, including the recorder's extension.
    pub fn file(&self) -> PathBuf {
        record_path(&self.path)
    }

    pub fn exists(&self) -> bool {
        self.file().is_file()
    }

    pub fn save<B: Backend>(&self, features: Tensor<B, 2>) -> Result<()> {
        save_tensor(features, &self.path)?;
        Ok(())
    }

    pub fn load<B: Backend>(&self, device: &B::Device) -> Result<FeatureMatrix> {
        if !self.exists() {
            bail!(
                "encoded {} features not found at '{}'; run with --encode 1 first",
                self.split.as_str(),
                self.file().display()
            );
        }
        to_matrix(load_tensor::<B>(&self.path, device)?)
    }
}

/// The two artifacts produced by the encoding stage.
#[derive(Debug, Clone)]
pub struct EncodedSplits {
    pub train: EncodedFeatures,
    pub val:   EncodedFeatures,
}

impl EncodedSplits {
    pub fn locate(encode_dir: &Path) -> Self {
        Self {
            train: EncodedFeatures::locate(encode_dir, Split::Train),
            val:   EncodedFeatures::locate(encode_dir, Split::Val),
        }
    }

    pub fn get(&self, split: Split) -> &EncodedFeatures {
        match split {
            Split::Train => &self.train,
            Split::Val   => &self.val,
        }
    }
}
