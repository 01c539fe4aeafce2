// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Two pipelines share this layer:
//
//   Encoding (stage 1)
//     clip manifest ──► FrameDataset ──► FrameBatcher ──► [B, 3, H, W]
//
//   Train / test (stage 2)
//     encoded features ─┐
//     clip manifest ────┼─► SequenceDataset ──► SequenceBatcher ──► [B, T, D]
//     pose manifest ────┘ (optional)
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Clip and pose manifests (JSON or frame directory tree)
pub mod manifest;

/// Raw frame dataset and image decoding for the encoder
pub mod frames;

/// Per-clip feature sequences built from encoded features
pub mod dataset;

/// Burn Batcher turning sequences into tensor batches
pub mod batcher;
