// ============================================================
// Layer 1 — Command-Line Arguments
// ============================================================
// One flat set of flags. The first block mirrors the classic
// harness flags; the rest tune things the harness used to
// hard-code (seed, frame selection, model width, log root).
//
// clap handles malformed values with its usage message and exit
// code 2; everything else is checked when the run starts.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::Args;
use std::path::PathBuf;

use crate::application::config::RunConfig;
use crate::domain::run::{DeviceSelector, Mode};
use crate::ml::model::ModelKind;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Mode is one of 'train', 'test'
    #[arg(long, default_value = "train")]
    pub mode: Mode,

    /// Name of the model to use (baseline_lstm, frame_mean)
    #[arg(long, default_value = "baseline_lstm")]
    pub model: ModelKind,

    /// 1 runs the feature-encoding pre-pass first, 0 reuses --encode-path
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub encode: u8,

    /// GPU index, 'auto' for the default adapter, or 'cpu'
    #[arg(long, default_value = "0")]
    pub gpu: DeviceSelector,

    /// Size of the minibatch
    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    /// Learning rate for SGD
    #[arg(long, default_value_t = 1e-3)]
    pub learning_rate: f64,

    /// Number of epochs to train for
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    // ── Dataset and logger paths ─────────────────────────────────────────────
    /// Training clip manifest (JSON file or <label>/<clip>/<frame> tree)
    #[arg(long)]
    pub image_train_path: Option<PathBuf>,

    /// Validation clip manifest
    #[arg(long)]
    pub image_val_path: Option<PathBuf>,

    /// Directory holding encoded_features_{train,val}
    #[arg(long)]
    pub encode_path: Option<PathBuf>,

    /// Training pose manifest (JSON)
    #[arg(long)]
    pub pose_train_path: Option<PathBuf>,

    /// Validation pose manifest (JSON)
    #[arg(long)]
    pub pose_val_path: Option<PathBuf>,

    /// Unique log directory name under --log-root. If empty, nothing is logged
    #[arg(long, default_value = "")]
    pub log: String,

    /// Directory that run directories are created under
    #[arg(long, default_value = "log")]
    pub log_root: PathBuf,

    // ── Model and data tuning ────────────────────────────────────────────────
    /// Seed for weight initialisation
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// LSTM hidden width
    #[arg(long, default_value_t = 256)]
    pub hidden_size: usize,

    /// Dropout before the classifier head
    #[arg(long, default_value_t = 0.0)]
    pub dropout: f64,

    /// Number of classes (default: largest label in the manifests + 1)
    #[arg(long)]
    pub num_classes: Option<usize>,

    /// Square size frames are resized to before encoding
    #[arg(long, default_value_t = 112)]
    pub image_size: usize,

    /// First frame index kept from each clip
    #[arg(long, default_value_t = 0)]
    pub frame_start: usize,

    /// Frame index where selection stops (exclusive)
    #[arg(long, default_value_t = 300)]
    pub frame_end: usize,

    /// Stride between kept frames
    #[arg(long, default_value_t = 5)]
    pub frame_step: usize,

    // ── Weights and outputs ──────────────────────────────────────────────────
    /// Frame encoder record to load instead of seeded weights
    #[arg(long)]
    pub encoder_weights: Option<PathBuf>,

    /// Model record evaluated in test mode
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    /// Where test mode saves the raw class scores
    #[arg(long)]
    pub save_scores: Option<PathBuf>,
}

/// The application layer never sees clap types.
impl From<RunArgs> for RunConfig {
    fn from(a: RunArgs) -> Self {
        RunConfig {
            mode:             a.mode,
            model:            a.model,
            encode:           a.encode == 1,
            gpu:              a.gpu,
            batch_size:       a.batch_size,
            learning_rate:    a.learning_rate,
            epochs:           a.epochs,
            image_train_path: a.image_train_path,
            image_val_path:   a.image_val_path,
            encode_path:      a.encode_path,
            pose_train_path:  a.pose_train_path,
            pose_val_path:    a.pose_val_path,
            log:              a.log,
            log_root:         a.log_root,
            seed:             a.seed,
            hidden_size:      a.hidden_size,
            dropout:          a.dropout,
            num_classes:      a.num_classes,
            image_size:       a.image_size,
            frame_start:      a.frame_start,
            frame_end:        a.frame_end,
            frame_step:       a.frame_step,
            encoder_weights:  a.encoder_weights,
            checkpoint:       a.checkpoint,
            save_scores:      a.save_scores,
        }
    }
}
