// ============================================================
// Layer 5 — Evaluation Routine
// ============================================================
// One inference-mode pass over a loader. Loss and correctness are
// computed by the same forward_classification the training loop
// uses; only the optimizer step is missing.
//
// Called with a model on a non-autodiff backend (model.valid() in
// the training loop, the inner backend in test mode), so no graph
// is recorded.

use anyhow::{bail, Result};
use burn::{data::dataloader::DataLoader, prelude::*};
use indicatif::ProgressBar;
use std::path::Path;

use crate::data::batcher::SequenceBatch;
use crate::infra::features::save_tensor;
use crate::ml::model::SequenceClassifier;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalReport {
    pub num_correct: usize,
    pub num_samples: usize,
    /// Mean of the per-batch losses
    pub mean_loss:   f64,
}

impl EvalReport {
    /// correct / samples, 0.0 for an empty pass
    pub fn accuracy(&self) -> f64 {
        if self.num_samples == 0 {
            0.0
        } else {
            self.num_correct as f64 / self.num_samples as f64
        }
    }
}

/// Evaluate `model` over every batch of `loader`.
///
/// With `save_scores`, the raw `[samples, classes]` scores are concatenated
/// in loader order and written there. Loaders passed here must not shuffle.
pub fn evaluate<B: Backend>(
    model:       &SequenceClassifier<B>,
    loader:      &dyn DataLoader<SequenceBatch<B>>,
    save_scores: Option<&Path>,
) -> Result<EvalReport> {
    let mut losses      = Vec::new();
    let mut all_scores  = Vec::new();
    let mut num_correct = 0usize;
    let mut num_samples = 0usize;

    let progress = ProgressBar::new_spinner();
    for batch in loader.iter() {
        let step = model.forward_classification(batch);
        losses.push(step.loss.into_scalar().elem::<f64>());
        num_correct += step.correct;
        num_samples += step.samples;

        if save_scores.is_some() {
            all_scores.push(step.scores);
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if let Some(path) = save_scores {
        if all_scores.is_empty() {
            bail!("no batches were evaluated, refusing to write empty scores to '{}'", path.display());
        }
        save_tensor(Tensor::cat(all_scores, 0), path)?;
    }

    let mean_loss = if losses.is_empty() {
        f64::NAN
    } else {
        losses.iter().sum::<f64>() / losses.len() as f64
    };
    let report = EvalReport { num_correct, num_samples, mean_loss };

    println!(
        "Got {} / {} correct ({:.2})",
        report.num_correct,
        report.num_samples,
        100.0 * report.accuracy()
    );
    Ok(report)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::data::dataloader::{batcher::Batcher, DataLoaderBuilder};
    use burn::data::dataset::Dataset;

    use crate::data::batcher::SequenceBatcher;
    use crate::data::dataset::{SequenceDataset, SequenceItem};
    use crate::infra::features::load_tensor;
    use crate::ml::model::{ModelKind, SequenceClassifierConfig};

    type TB = NdArray;

    fn dataset(n: usize) -> SequenceDataset {
        let items = (0..n)
            .map(|i| SequenceItem {
                features:  (0..6).map(|v| (i * 6 + v) as f32 / 10.0).collect(),
                timesteps: 3,
                dim:       2,
                label:     i % 3,
            })
            .collect();
        SequenceDataset::from_items(items).unwrap()
    }

    #[test]
    fn test_counts_cover_the_whole_dataset() {
        let device = Default::default();
        let model  = SequenceClassifierConfig::new(2, 3)
            .with_hidden_size(4)
            .init::<TB>(ModelKind::BaselineLstm, &device);
        let ds     = dataset(7);
        let n      = ds.len();
        let loader = DataLoaderBuilder::new(SequenceBatcher::<TB>::new(device.clone()))
            .batch_size(3)
            .build(ds);

        let report = evaluate(&model, loader.as_ref(), None).unwrap();
        assert_eq!(report.num_samples, n);
        assert!(report.num_correct <= report.num_samples);
        assert!((0.0..=1.0).contains(&report.accuracy()));
        assert!(report.mean_loss.is_finite());
    }

    #[test]
    fn test_saved_scores_follow_loader_order() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model  = SequenceClassifierConfig::new(2, 3)
            .init::<TB>(ModelKind::FrameMean, &device);
        let loader = DataLoaderBuilder::new(SequenceBatcher::<TB>::new(device.clone()))
            .batch_size(2)
            .build(dataset(5));

        let path = dir.path().join("scores");
        evaluate(&model, loader.as_ref(), Some(&path)).unwrap();

        let saved = load_tensor::<TB>(&path, &device).unwrap();
        assert_eq!(saved.dims(), [5, 3]);

        // Recompute all scores in one batch and compare row by row
        let all = SequenceBatcher::<TB>::new(device.clone())
            .batch((0..5).filter_map(|i| dataset(5).get(i)).collect());
        let expected = model.forward(all.features);
        let diff = (saved - expected).abs().max().into_scalar();
        assert!(diff < 1e-5);
    }

    #[test]
    fn test_empty_report_accuracy_is_zero() {
        let report = EvalReport { num_correct: 0, num_samples: 0, mean_loss: f64::NAN };
        assert_eq!(report.accuracy(), 0.0);
    }
}
