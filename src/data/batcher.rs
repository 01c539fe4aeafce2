// ============================================================
// Layer 4 — Sequence Batcher
// ============================================================
// Implements Burn's Batcher trait to stack SequenceItems into
//
//   features: [batch_size, timesteps, feature_dim]
//   labels:   [batch_size]
//
// Every item already has the same (timesteps, feature_dim) shape,
// so batching is a flatten followed by a reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SequenceItem;

#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    pub features: Tensor<B, 3>,
    pub labels:   Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created where the model lives.
#[derive(Clone, Debug)]
pub struct SequenceBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SequenceBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SequenceItem, SequenceBatch<B>> for SequenceBatcher<B> {
    fn batch(&self, items: Vec<SequenceItem>) -> SequenceBatch<B> {
        let batch_size = items.len();
        let timesteps  = items[0].timesteps;
        let dim        = items[0].dim;

        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();
        let flat: Vec<f32>   = items.into_iter().flat_map(|s| s.features).collect();

        let features = Tensor::<B, 3>::from_data(
            TensorData::new(flat, [batch_size, timesteps, dim]),
            &self.device,
        );
        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        SequenceBatch { features, labels }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_order() {
        let items = (0..3)
            .map(|i| SequenceItem {
                features:  vec![i as f32; 4 * 2],
                timesteps: 4,
                dim:       2,
                label:     i,
            })
            .collect();

        let batch = SequenceBatcher::<NdArray>::new(Default::default()).batch(items);
        assert_eq!(batch.features.dims(), [3, 4, 2]);
        assert_eq!(batch.labels.dims(), [3]);

        let labels: Vec<i64> = batch.labels.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(labels, vec![0, 1, 2]);
        let first_of_last: f32 = batch.features
            .slice([2..3, 0..1, 0..1])
            .into_scalar();
        assert_eq!(first_of_last, 2.0);
    }
}
