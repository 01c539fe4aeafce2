// ============================================================
// Layer 2 — Run Configuration
// ============================================================
// The one record every stage reads. Built once from the command
// line (see cli/args.rs), never mutated, passed by reference.
// Serialisable so the exact configuration of a training run is
// dumped to params.json next to its metrics and checkpoints.
//
// Path flags are optional at parse time; each stage asks for the
// paths it needs and gets an error naming the missing flag.

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::clip::FrameSelection;
use crate::domain::run::{DeviceSelector, Mode, Split};
use crate::ml::model::ModelKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub mode:          Mode,
    pub model:         ModelKind,
    pub encode:        bool,
    pub gpu:           DeviceSelector,
    pub batch_size:    usize,
    pub learning_rate: f64,
    pub epochs:        usize,

    pub image_train_path: Option<PathBuf>,
    pub image_val_path:   Option<PathBuf>,
    pub encode_path:      Option<PathBuf>,
    pub pose_train_path:  Option<PathBuf>,
    pub pose_val_path:    Option<PathBuf>,

    /// Run directory name under `log_root`; empty disables logging
    pub log:      String,
    pub log_root: PathBuf,

    pub seed:        u64,
    pub hidden_size: usize,
    pub dropout:     f64,
    /// Overrides the class count derived from the manifests
    pub num_classes: Option<usize>,

    pub image_size:  usize,
    pub frame_start: usize,
    pub frame_end:   usize,
    pub frame_step:  usize,

    pub encoder_weights: Option<PathBuf>,
    pub checkpoint:      Option<PathBuf>,
    pub save_scores:     Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode:             Mode::Train,
            model:            ModelKind::BaselineLstm,
            encode:           false,
            gpu:              DeviceSelector::Gpu(0),
            batch_size:       100,
            learning_rate:    1e-3,
            epochs:           10,
            image_train_path: None,
            image_val_path:   None,
            encode_path:      None,
            pose_train_path:  None,
            pose_val_path:    None,
            log:              String::new(),
            log_root:         PathBuf::from("log"),
            seed:             42,
            hidden_size:      256,
            dropout:          0.0,
            num_classes:      None,
            image_size:       112,
            frame_start:      0,
            frame_end:        300,
            frame_step:       5,
            encoder_weights:  None,
            checkpoint:       None,
            save_scores:      None,
        }
    }
}

impl RunConfig {
    /// Reject values no stage can run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("--batch-size must be at least 1");
        }
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 {
            bail!("--learning-rate must be positive, got {}", self.learning_rate);
        }
        if !(0.0..1.0).contains(&self.dropout) {
            bail!("--dropout must be in [0, 1), got {}", self.dropout);
        }
        if self.image_size == 0 {
            bail!("--image-size must be at least 1");
        }
        if self.num_classes == Some(0) {
            bail!("--num-classes must be at least 1");
        }
        self.frame_selection()?;
        Ok(())
    }

    pub fn logging_enabled(&self) -> bool {
        !self.log.is_empty()
    }

    pub fn frame_selection(&self) -> Result<FrameSelection> {
        FrameSelection::new(self.frame_start, self.frame_end, self.frame_step)
    }

    pub fn image_path(&self, split: Split) -> Result<&Path> {
        match split {
            Split::Train => require(&self.image_train_path, "--image-train-path"),
            Split::Val   => require(&self.image_val_path, "--image-val-path"),
        }
    }

    /// Pose manifests are optional: without one, sequences carry image features only.
    pub fn pose_path(&self, split: Split) -> Option<&Path> {
        match split {
            Split::Train => self.pose_train_path.as_deref(),
            Split::Val   => self.pose_val_path.as_deref(),
        }
    }

    pub fn encode_dir(&self) -> Result<&Path> {
        require(&self.encode_path, "--encode-path")
    }
}

fn require<'a>(path: &'a Option<PathBuf>, flag: &str) -> Result<&'a Path> {
    path.as_deref().ok_or_else(|| anyhow!("{flag} is required for this run"))
}
