// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The training loop and the use cases only talk to these traits,
// so a CSV logger, an in-memory logger in tests, or a manifest
// directory walker can be swapped in without touching them.

use anyhow::Result;
use crate::domain::clip::ClipRecord;

// ─── ClipSource ───────────────────────────────────────────────────────────────
/// Anything that can enumerate labelled clips.
///
/// Implementations:
///   - ClipManifest → a JSON manifest file or a `<label>/<clip>/` frame tree
pub trait ClipSource {
    /// Load every clip, in a stable order.
    fn load_clips(&self) -> Result<Vec<ClipRecord>>;
}

// ─── ScalarSink ───────────────────────────────────────────────────────────────
/// Receives scalar summaries tagged with a step (the epoch index).
///
/// Implementations:
///   - ScalarLogger → appends to `scalars.csv` in the run directory
pub trait ScalarSink {
    fn scalar_summary(&mut self, tag: &str, value: f64, step: usize) -> Result<()>;
}
