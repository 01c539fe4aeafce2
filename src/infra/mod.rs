// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the host (filesystem, GPU adapters)
// on behalf of a run:
//
//   checkpoint.rs  the unique run directory, params.json and
//                  model weights (Burn CompactRecorder)
//
//   metrics.rs     epoch metrics and the scalar CSV logger
//
//   features.rs    encoded feature matrices and saved score
//                  tensors (full-precision MessagePack records)
//
//   device.rs      --gpu resolved against the adapters wgpu sees

/// Run directory, parameter dump and model checkpoints
pub mod checkpoint;

/// Epoch metrics and scalar logging
pub mod metrics;

/// Encoded feature artifacts and score tensors
pub mod features;

/// Host device discovery with CPU fallback
pub mod device;
