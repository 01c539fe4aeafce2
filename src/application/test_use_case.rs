// ============================================================
// Layer 2 — TestUseCase (stage 2, --mode test)
// ============================================================
// One evaluation pass over the validation split:
//
//   Step 1: Build the val sequence dataset    (Layer 4 - data)
//   Step 2: Rebuild the model, load weights   (Layer 5/6)
//   Step 3: Evaluate, optionally save scores  (Layer 5 - ml)
//
// With --checkpoint the architecture comes from the model.json the
// training run saved beside it, and the model flags are ignored.
// Without one, an untrained model is built from the flags; its class
// count then covers the train manifest too when it is given.

use anyhow::{bail, Result};
use burn::{data::dataloader::DataLoaderBuilder, prelude::*};

use crate::application::{
    config::RunConfig,
    inputs::{load_clips, resolve_num_classes, SplitInputs},
};
use crate::data::batcher::SequenceBatcher;
use crate::domain::clip::class_count;
use crate::domain::run::Split;
use crate::infra::{
    checkpoint::{load_model_spec, load_module},
    features::EncodedSplits,
};
use crate::ml::evaluator::{evaluate, EvalReport};
use crate::ml::model::{ModelSpec, SequenceClassifierConfig};

pub struct TestUseCase<'a> {
    config:   &'a RunConfig,
    features: EncodedSplits,
}

impl<'a> TestUseCase<'a> {
    pub fn new(config: &'a RunConfig, features: EncodedSplits) -> Self {
        Self { config, features }
    }

    pub fn execute<B: Backend>(&self, device: &B::Device) -> Result<EvalReport> {
        let cfg = self.config;

        // ── Step 1: Validation dataset ────────────────────────────────────────
        let val = SplitInputs::load::<B>(cfg, &self.features.val, device)?;

        // ── Step 2: Model ─────────────────────────────────────────────────────
        let model = match &cfg.checkpoint {
            Some(path) => {
                let spec = load_model_spec(path)?;
                check_compatible(&spec, val.dataset.feature_dim(), class_count(&val.clips))?;
                if spec.kind != cfg.model {
                    tracing::warn!("Checkpoint is a {} model, ignoring --model {}", spec.kind, cfg.model);
                }
                load_module::<B, _>(spec.init::<B>(device), path, device)?
            }
            None => {
                tracing::warn!("No --checkpoint given, evaluating an untrained model");
                let train_clips = match cfg.image_train_path {
                    Some(_) => load_clips(cfg, Split::Train)?,
                    None    => Vec::new(),
                };
                let num_classes = resolve_num_classes(cfg, &[&val.clips[..], &train_clips[..]])?;
                SequenceClassifierConfig::new(val.dataset.feature_dim(), num_classes)
                    .with_hidden_size(cfg.hidden_size)
                    .with_dropout(cfg.dropout)
                    .init::<B>(cfg.model, device)
            }
        };

        // ── Step 3: Evaluate ──────────────────────────────────────────────────
        let loader = DataLoaderBuilder::new(SequenceBatcher::<B>::new(device.clone()))
            .batch_size(cfg.batch_size)
            .build(val.dataset);

        evaluate(&model, loader.as_ref(), cfg.save_scores.as_deref())
    }
}

/// The saved architecture must accept the val features and labels.
fn check_compatible(spec: &ModelSpec, feature_dim: usize, labels_needed: usize) -> Result<()> {
    if spec.classifier.input_dim != feature_dim {
        bail!(
            "checkpoint expects {}-dim frame features but the val split has {feature_dim}; \
             check --encode-path and the pose manifests",
            spec.classifier.input_dim
        );
    }
    if spec.classifier.num_classes < labels_needed {
        bail!(
            "checkpoint has {} classes but the val manifest uses labels up to {}",
            spec.classifier.num_classes,
            labels_needed - 1
        );
    }
    Ok(())
}
