// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All forward passes, losses and optimizer steps live here.
//
//   model.rs      many-to-one sequence classifiers and the
//                 factory that picks one by name
//
//   encoder.rs    fixed CNN that turns frames into feature
//                 vectors for the encoding pre-pass
//
//   trainer.rs    epoch loop (forward, cross-entropy, backward,
//                 SGD step) with per-epoch validation
//
//   evaluator.rs  inference-mode pass returning accuracy and
//                 mean loss, optionally persisting raw scores
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Sequence classifier architectures and the model factory
pub mod model;

/// Frame feature extractor used by the encoding pre-pass
pub mod encoder;

/// Training loop with per-epoch validation
pub mod trainer;

/// Evaluation routine shared by training and test mode
pub mod evaluator;
