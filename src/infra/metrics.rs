// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Scalar summaries go to `scalars.csv` in the run directory,
// one row per (tag, step):
//
//   tag,step,value
//   epoch_train_loss,0,1.093412
//   epoch_train_acc,0,0.412000
//   epoch_val_loss,0,1.071200
//   epoch_val_acc,0,0.455000
//   epoch_train_loss,1,0.982011
//   ...
//
// Long format keeps the file valid when new tags are added and
// loads directly into any plotting tool with a pivot.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::domain::traits::ScalarSink;

/// Summary of one training epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Zero-based epoch index, also used as the logger step
    pub epoch: usize,

    /// Mean of the per-batch training losses
    pub train_loss: f64,

    /// correct / samples over the whole training pass
    pub train_acc: f64,

    pub val_loss: f64,
    pub val_acc:  f64,

    /// Optimizer steps taken this epoch (one per training batch)
    pub steps: usize,
}

impl EpochMetrics {
    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }

    /// The four tagged scalars forwarded to the logger.
    pub fn scalars(&self) -> [(&'static str, f64); 4] {
        [
            ("epoch_train_loss", self.train_loss),
            ("epoch_train_acc",  self.train_acc),
            ("epoch_val_loss",   self.val_loss),
            ("epoch_val_acc",    self.val_acc),
        ]
    }
}

/// Appends scalar summaries to a CSV file.
pub struct ScalarLogger {
    csv_path: PathBuf,
}

impl ScalarLogger {
    /// Create a logger writing into `dir`.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create log directory '{}'", dir.display()))?;

        let csv_path = dir.join("scalars.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "tag,step,value")?;
            tracing::debug!("Created scalar log: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

impl ScalarSink for ScalarLogger {
    fn scalar_summary(&mut self, tag: &str, value: f64, step: usize) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot append to '{}'", self.csv_path.display()))?;
        writeln!(f, "{tag},{step},{value:.6}")?;
        Ok(())
    }
}
