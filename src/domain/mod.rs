// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types describing a run: which mode, which device,
// which clips, which frames of each clip. No burn types and no
// file I/O live here, so everything in this layer is testable
// without a backend.

// Run mode, dataset split and device selection
pub mod run;

// Labelled clips and the frame selection applied to them
pub mod clip;

// Abstractions implemented by the data and infra layers
pub mod traits;
