// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Plain epoch loop, no Learner:
//
//   for epoch in 0..epochs
//     for batch in train_loader           (autodiff backend)
//       forward → cross-entropy → backward → SGD step
//     model.valid() → evaluate(val_loader) (inner backend)
//     log four scalars, print summary, checkpoint
//
// SGD uses momentum 0.9 with Nesterov and no dampening.
//
// Reference: Burn Book §5, Sutskever et al. (2013) Nesterov momentum

use anyhow::Result;
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::AutodiffModule,
    optim::{momentum::MomentumConfig, GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use indicatif::ProgressBar;

use crate::data::{batcher::SequenceBatcher, dataset::SequenceDataset};
use crate::domain::traits::ScalarSink;
use crate::infra::{checkpoint::CheckpointManager, metrics::EpochMetrics};
use crate::ml::evaluator::evaluate;
use crate::ml::model::SequenceClassifier;

/// Hyperparameters the loop itself needs.
#[derive(Debug, Clone, Copy)]
pub struct TrainSettings {
    pub epochs:        usize,
    pub batch_size:    usize,
    pub learning_rate: f64,
}

/// What a finished loop reports. The trained weights live in the
/// run directory checkpoints, not here.
#[derive(Debug)]
pub struct TrainOutcome {
    pub history: Vec<EpochMetrics>,
}

pub fn sgd_nesterov() -> SgdConfig {
    SgdConfig::new().with_momentum(Some(
        MomentumConfig::new()
            .with_momentum(0.9)
            .with_dampening(0.0)
            .with_nesterov(true),
    ))
}

pub fn run_training<B: AutodiffBackend>(
    mut model:   SequenceClassifier<B>,
    train_set:   SequenceDataset,
    val_set:     SequenceDataset,
    settings:    TrainSettings,
    device:      &B::Device,
    mut logger:  Option<&mut dyn ScalarSink>,
    checkpoints: Option<&CheckpointManager>,
) -> Result<TrainOutcome> {
    let train_batches = train_set.len().div_ceil(settings.batch_size);

    // Neither loader shuffles: batch order is the manifest order
    let train_loader = DataLoaderBuilder::new(SequenceBatcher::<B>::new(device.clone()))
        .batch_size(settings.batch_size)
        .build(train_set);
    let val_loader = DataLoaderBuilder::new(SequenceBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(settings.batch_size)
        .build(val_set);

    let mut optim = sgd_nesterov().init();
    let mut history = Vec::with_capacity(settings.epochs);
    let mut best_val_loss = f64::INFINITY;

    for epoch in 0..settings.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut epoch_loss  = Vec::with_capacity(train_batches);
        let mut num_correct = 0usize;
        let mut num_samples = 0usize;
        let mut steps       = 0usize;

        let progress = ProgressBar::new(train_batches as u64);
        for batch in train_loader.iter() {
            let step = model.forward_classification(batch);
            epoch_loss.push(step.loss.clone().into_scalar().elem::<f64>());
            num_correct += step.correct;
            num_samples += step.samples;

            let grads = step.loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(settings.learning_rate, model, grads);
            steps += 1;
            progress.inc(1);
        }
        progress.finish_and_clear();

        // ── Validation phase ──────────────────────────────────────────────────
        let val = evaluate(&model.valid(), val_loader.as_ref(), None)?;

        let metrics = EpochMetrics {
            epoch,
            train_loss: mean(&epoch_loss),
            train_acc:  if num_samples > 0 { num_correct as f64 / num_samples as f64 } else { 0.0 },
            val_loss:   val.mean_loss,
            val_acc:    val.accuracy(),
            steps,
        };

        if let Some(logger) = logger.as_deref_mut() {
            for (tag, value) in metrics.scalars() {
                logger.scalar_summary(tag, value, epoch)?;
            }
        }

        println!(
            "Epoch {} | train loss: {:.4} | val loss: {:.4} | train acc: {:.4} | val acc: {:.4}",
            epoch + 1, metrics.train_loss, metrics.val_loss, metrics.train_acc, metrics.val_acc,
        );

        if let Some(ckpt) = checkpoints {
            ckpt.save_model::<B, _>(&model, &format!("model_epoch_{}", epoch + 1))?;
            if metrics.is_improvement(best_val_loss) {
                ckpt.save_model::<B, _>(&model, "model_best_val")?;
                tracing::info!("New best validation loss {:.4} at epoch {}", metrics.val_loss, epoch + 1);
            }
        }
        if metrics.val_loss < best_val_loss {
            best_val_loss = metrics.val_loss;
        }

        history.push(metrics);
    }

    tracing::info!("Training complete after {} epochs", settings.epochs);
    Ok(TrainOutcome { history })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    use crate::data::dataset::SequenceItem;
    use crate::ml::model::{ModelKind, SequenceClassifierConfig};

    type TB = Autodiff<NdArray>;

    #[derive(Default)]
    struct MemorySink {
        rows: Vec<(String, f64, usize)>,
    }

    impl ScalarSink for MemorySink {
        fn scalar_summary(&mut self, tag: &str, value: f64, step: usize) -> Result<()> {
            self.rows.push((tag.to_string(), value, step));
            Ok(())
        }
    }

    /// Class 0 sequences are all +1, class 1 sequences all -1.
    fn separable(n: usize, timesteps: usize, dim: usize) -> SequenceDataset {
        let items = (0..n)
            .map(|i| {
                let label = i % 2;
                let sign  = if label == 0 { 1.0 } else { -1.0 };
                SequenceItem { features: vec![sign; timesteps * dim], timesteps, dim, label }
            })
            .collect();
        SequenceDataset::from_items(items).unwrap()
    }

    #[test]
    fn test_ten_samples_batch_five_takes_two_steps() {
        TB::seed(7);
        let device = Default::default();
        let model  = SequenceClassifierConfig::new(3, 2)
            .with_hidden_size(4)
            .init::<TB>(ModelKind::BaselineLstm, &device);
        let settings = TrainSettings { epochs: 1, batch_size: 5, learning_rate: 1e-3 };
        let mut sink = MemorySink::default();

        let outcome = run_training(
            model, separable(10, 4, 3), separable(4, 4, 3),
            settings, &device, Some(&mut sink as &mut dyn ScalarSink), None,
        ).unwrap();

        assert_eq!(outcome.history.len(), 1);
        let epoch = &outcome.history[0];
        assert_eq!(epoch.steps, 2);
        assert!((0.0..=1.0).contains(&epoch.train_acc));
        assert!((0.0..=1.0).contains(&epoch.val_acc));

        let tags: Vec<&str> = sink.rows.iter().map(|(t, _, _)| t.as_str()).collect();
        assert_eq!(tags, vec!["epoch_train_loss", "epoch_train_acc", "epoch_val_loss", "epoch_val_acc"]);
        assert!(sink.rows.iter().all(|(_, _, step)| *step == 0));
    }

    #[test]
    fn test_loss_falls_on_separable_data() {
        TB::seed(42);
        let device = Default::default();
        let model  = SequenceClassifierConfig::new(2, 2)
            .init::<TB>(ModelKind::FrameMean, &device);
        let settings = TrainSettings { epochs: 8, batch_size: 4, learning_rate: 0.1 };

        let outcome = run_training(
            model, separable(16, 3, 2), separable(6, 3, 2),
            settings, &device, None, None,
        ).unwrap();

        let first = outcome.history.first().unwrap();
        let last  = outcome.history.last().unwrap();
        assert!(last.train_loss < first.train_loss);
        assert!(last.val_loss < first.val_loss);
    }

    #[test]
    fn test_checkpoints_written_per_epoch() {
        let root   = tempfile::tempdir().unwrap();
        let run    = CheckpointManager::create_unique(root.path(), "ckpt", 0.01).unwrap();
        let device = Default::default();
        let model  = SequenceClassifierConfig::new(2, 2)
            .init::<TB>(ModelKind::FrameMean, &device);
        let settings = TrainSettings { epochs: 2, batch_size: 3, learning_rate: 0.01 };

        run_training(
            model, separable(6, 2, 2), separable(2, 2, 2),
            settings, &device, None, Some(&run),
        ).unwrap();

        assert!(run.dir().join("model_epoch_1.mpk.gz").exists());
        assert!(run.dir().join("model_epoch_2.mpk.gz").exists());
        assert!(run.dir().join("model_best_val.mpk.gz").exists());
    }
}
