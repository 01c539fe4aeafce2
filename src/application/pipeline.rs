// ============================================================
// Layer 2 — Two-Stage Pipeline
// ============================================================
//
//   stage 1 (--encode 1)          stage 2 (--mode)
//   ┌──────────────────┐          ┌──────────────────────┐
//   │ EncodeUseCase    │─────────▶│ TrainUseCase  (train)│
//   │ inner backend    │ Encoded  │ TestUseCase   (test) │
//   └──────────────────┘ Splits   └──────────────────────┘
//
// Without --encode the artifacts of an earlier encoding run are
// located under --encode-path instead. Either way stage 2 only
// sees the typed EncodedSplits handle.
//
// The backend is chosen by the caller (cli), so this function is
// generic over it and the tests drive it on NdArray.

use anyhow::Result;
use burn::tensor::backend::AutodiffBackend;

use crate::application::{
    config::RunConfig,
    encode_use_case::EncodeUseCase,
    test_use_case::TestUseCase,
    train_use_case::{TrainReport, TrainUseCase},
};
use crate::domain::run::Mode;
use crate::infra::features::EncodedSplits;
use crate::ml::evaluator::EvalReport;

#[derive(Debug)]
pub enum PipelineOutcome {
    Trained(TrainReport),
    Tested(EvalReport),
}

pub fn run_pipeline<B: AutodiffBackend>(cfg: &RunConfig, device: &B::Device) -> Result<PipelineOutcome> {
    println!("Setting up...");
    cfg.validate()?;
    println!("Using device: {device:?} ({})", cfg.gpu);
    B::seed(cfg.seed);

    // ── Stage 1: encoded features ─────────────────────────────────────────────
    let features = if cfg.encode {
        println!("Starting encoding...");
        EncodeUseCase::new(cfg).execute::<B::InnerBackend>(device)?
    } else {
        EncodedSplits::locate(cfg.encode_dir()?)
    };

    // ── Stage 2: train or test ────────────────────────────────────────────────
    match cfg.mode {
        Mode::Train => {
            println!("Starting training...");
            let report = TrainUseCase::new(cfg, features).execute::<B>(device)?;
            Ok(PipelineOutcome::Trained(report))
        }
        Mode::Test => {
            println!("Starting testing...");
            let report = TestUseCase::new(cfg, features).execute::<B::InnerBackend>(device)?;
            Ok(PipelineOutcome::Tested(report))
        }
    }
}
