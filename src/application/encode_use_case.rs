// ============================================================
// Layer 2 — EncodeUseCase (stage 1)
// ============================================================
// Optional pre-pass, run with --encode 1:
//
//   Step 1: Build the frame encoder          (Layer 5 - ml)
//           seeded init, or --encoder-weights
//   Step 2: For train, then val:
//             load the clip manifest         (Layer 4 - data)
//             flatten clips into frames      (Layer 4 - data)
//             encode every frame batch       (Layer 5 - ml)
//             persist the feature matrix     (Layer 6 - infra)
//
// Runs on a plain (non-autodiff) backend: nothing here needs
// gradients. The returned EncodedSplits is the only thing stage 2
// needs from this stage.

use anyhow::Result;
use burn::prelude::*;

use crate::application::{config::RunConfig, inputs::load_clips};
use crate::data::frames::{FrameBatcher, FrameDataset};
use crate::domain::run::Split;
use crate::infra::{checkpoint::load_module, features::EncodedSplits};
use crate::ml::encoder::{FrameEncoder, FrameEncoderConfig};

pub struct EncodeUseCase<'a> {
    config: &'a RunConfig,
}

impl<'a> EncodeUseCase<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    pub fn execute<B: Backend>(&self, device: &B::Device) -> Result<EncodedSplits> {
        let cfg    = self.config;
        let splits = EncodedSplits::locate(cfg.encode_dir()?);

        // ── Step 1: Frame encoder ─────────────────────────────────────────────
        let encoder = self.build_encoder::<B>(device)?;
        let batcher = FrameBatcher::<B>::new(cfg.image_size, device.clone());

        // ── Step 2: Encode both splits ────────────────────────────────────────
        for split in [Split::Train, Split::Val] {
            let clips  = load_clips(cfg, split)?;
            let frames = FrameDataset::from_clips(&clips);
            tracing::info!("Encoding {} {} frames", frames.items().len(), split.as_str());

            let features = encoder.encode_dataset(&frames, &batcher, cfg.batch_size)?;
            splits.get(split).save(features)?;
        }

        Ok(splits)
    }

    fn build_encoder<B: Backend>(&self, device: &B::Device) -> Result<FrameEncoder<B>> {
        let encoder = FrameEncoderConfig::new().init::<B>(device);
        match &self.config.encoder_weights {
            Some(path) => load_module::<B, _>(encoder, path, device),
            None => {
                tracing::warn!("No --encoder-weights given, encoding with seeded random weights");
                Ok(encoder)
            }
        }
    }
}
