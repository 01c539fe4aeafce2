// ============================================================
// Layer 2 — TrainUseCase (stage 2, --mode train)
// ============================================================
// Orchestrates training on already-encoded features:
//
//   Step 1: Build train/val sequence datasets (Layer 4 - data)
//   Step 2: Resolve the class count           (Layer 2)
//   Step 3: Build the model via the factory   (Layer 5 - ml)
//   Step 4: Open the run directory            (Layer 6 - infra)
//           params.json, model.json and scalars.csv,
//           only when --log is set
//   Step 5: Run the training loop             (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use burn::tensor::backend::AutodiffBackend;
use std::path::PathBuf;

use crate::application::{
    config::RunConfig,
    inputs::{resolve_num_classes, SplitInputs},
};
use crate::domain::traits::ScalarSink;
use crate::infra::{checkpoint::CheckpointManager, features::EncodedSplits, metrics::{EpochMetrics, ScalarLogger}};
use crate::ml::model::{ModelSpec, SequenceClassifierConfig};
use crate::ml::trainer::{run_training, TrainSettings};

/// What a finished training run leaves behind.
#[derive(Debug)]
pub struct TrainReport {
    pub history: Vec<EpochMetrics>,
    /// None when logging was disabled
    pub run_dir: Option<PathBuf>,
}

pub struct TrainUseCase<'a> {
    config:   &'a RunConfig,
    features: EncodedSplits,
}

impl<'a> TrainUseCase<'a> {
    pub fn new(config: &'a RunConfig, features: EncodedSplits) -> Self {
        Self { config, features }
    }

    pub fn execute<B: AutodiffBackend>(&self, device: &B::Device) -> Result<TrainReport> {
        let cfg = self.config;

        // ── Step 1: Sequence datasets ─────────────────────────────────────────
        let train = SplitInputs::load::<B>(cfg, &self.features.train, device)?;
        let val   = SplitInputs::load::<B>(cfg, &self.features.val, device)?;

        // ── Step 2: Class count ───────────────────────────────────────────────
        let num_classes = resolve_num_classes(cfg, &[&train.clips[..], &val.clips[..]])?;
        tracing::info!("{} classes", num_classes);

        // ── Step 3: Model ─────────────────────────────────────────────────────
        let spec = ModelSpec {
            kind:       cfg.model,
            classifier: SequenceClassifierConfig::new(train.dataset.feature_dim(), num_classes)
                .with_hidden_size(cfg.hidden_size)
                .with_dropout(cfg.dropout),
        };
        let model = spec.init::<B>(device);

        // ── Step 4: Run directory ─────────────────────────────────────────────
        let run = if cfg.logging_enabled() {
            let run = CheckpointManager::create_unique(&cfg.log_root, &cfg.log, cfg.learning_rate)?;
            run.save_params(cfg)?;
            run.save_model_spec(&spec)?;
            println!("All training logs will be saved to: {}", run.dir().display());
            Some(run)
        } else {
            println!("Logging disabled (--log is empty)");
            None
        };
        let mut scalars = run.as_ref().map(|r| ScalarLogger::new(r.dir())).transpose()?;

        // ── Step 5: Train ─────────────────────────────────────────────────────
        let settings = TrainSettings {
            epochs:        cfg.epochs,
            batch_size:    cfg.batch_size,
            learning_rate: cfg.learning_rate,
        };
        let outcome = run_training(
            model,
            train.dataset,
            val.dataset,
            settings,
            device,
            scalars.as_mut().map(|s| s as &mut dyn ScalarSink),
            run.as_ref(),
        )?;

        Ok(TrainReport {
            history: outcome.history,
            run_dir: run.map(|r| r.dir().to_path_buf()),
        })
    }
}
