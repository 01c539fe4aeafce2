// ============================================================
// Layer 5 — Frame Encoder
// ============================================================
// A small fixed CNN used by the encoding pre-pass:
//
//   [B, 3, H, W]
//     conv 3×3 stride 2 → ReLU      (3  → 16)
//     conv 3×3 stride 2 → ReLU      (16 → 32)
//     conv 3×3 stride 2 → ReLU      (32 → feature_dim)
//     global average pool
//   [B, feature_dim]
//
// The encoder is never trained here. Its weights either come from a
// record file (--encoder-weights) or from a seeded initialisation, so
// the same frames always map to the same features within a setup.

use anyhow::{bail, Result};
use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        PaddingConfig2d,
    },
    prelude::*,
    tensor::{activation::relu, module::adaptive_avg_pool2d},
};
use indicatif::ProgressBar;

use crate::data::frames::{FrameBatcher, FrameDataset};

#[derive(Config, Debug)]
pub struct FrameEncoderConfig {
    #[config(default = 64)]
    pub feature_dim: usize,
}

impl FrameEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> FrameEncoder<B> {
        let conv = |c_in: usize, c_out: usize| -> Conv2d<B> {
            Conv2dConfig::new([c_in, c_out], [3, 3])
                .with_stride([2, 2])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device)
        };
        FrameEncoder {
            conv1: conv(3, 16),
            conv2: conv(16, 32),
            conv3: conv(32, self.feature_dim),
        }
    }
}

#[derive(Module, Debug)]
pub struct FrameEncoder<B: Backend> {
    pub conv1: Conv2d<B>,
    pub conv2: Conv2d<B>,
    pub conv3: Conv2d<B>,
}

impl<B: Backend> FrameEncoder<B> {
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.conv1.forward(images));
        let x = relu(self.conv2.forward(x));
        let x = relu(self.conv3.forward(x));
        let [batch, channels, _, _] = x.dims();
        adaptive_avg_pool2d(x, [1, 1]).reshape([batch, channels])
    }

    /// Run the encoder over every frame of `dataset`, in dataset order,
    /// and return the stacked features `[frames, feature_dim]`.
    pub fn encode_dataset(
        &self,
        dataset:    &FrameDataset,
        batcher:    &FrameBatcher<B>,
        batch_size: usize,
    ) -> Result<Tensor<B, 2>> {
        let items = dataset.items();
        if items.is_empty() {
            bail!("nothing to encode: the frame dataset is empty");
        }

        let progress = ProgressBar::new(items.len().div_ceil(batch_size) as u64);
        let mut chunks = Vec::with_capacity(items.len().div_ceil(batch_size));
        for chunk in items.chunks(batch_size) {
            let batch = batcher.batch(chunk)?;
            chunks.push(self.forward(batch.images));
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(Tensor::cat(chunks, 0))
    }
}
