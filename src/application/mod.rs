// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only. Each use case reads the RunConfig,
// asks the data, ml and infra layers to do the work, and hands
// back a typed result:
//
//   EncodeUseCase → EncodedSplits   (stage 1)
//   TrainUseCase  → TrainReport     (stage 2, --mode train)
//   TestUseCase   → EvalReport      (stage 2, --mode test)
//
// pipeline.rs wires the two stages together.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

/// The run configuration record
pub mod config;

/// Manifest + features + pose → sequence dataset
pub mod inputs;

pub mod encode_use_case;
pub mod train_use_case;
pub mod test_use_case;

/// Stage 1 → stage 2 orchestration
pub mod pipeline;
