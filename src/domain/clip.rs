// ============================================================
// Layer 3 — Clips and Frame Selection
// ============================================================
// A clip is an ordered run of frames with one class label.
// The recurrent model never sees every frame: a FrameSelection
// picks a fixed, evenly strided subset so every clip becomes a
// sequence of the same length.
//
// Example with the defaults (0..300 step 5):
//   frames picked: 0, 5, 10, ..., 295   → 60 timesteps
//
// A clip shorter than the selection repeats its last frame, so a
// 42-frame clip yields 0, 5, ..., 40, 41, 41, ..., 41.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One labelled clip from a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipRecord {
    /// Identifier used to join pose data onto the clip
    pub id: String,

    /// Class index in [0, num_classes)
    pub label: usize,

    /// Frame image paths, in temporal order
    pub frames: Vec<PathBuf>,
}

impl ClipRecord {
    pub fn new(id: impl Into<String>, label: usize, frames: Vec<PathBuf>) -> Self {
        Self { id: id.into(), label, frames }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Number of classes implied by a set of clips (max label + 1).
pub fn class_count<'a>(clips: impl IntoIterator<Item = &'a ClipRecord>) -> usize {
    clips.into_iter().map(|c| c.label + 1).max().unwrap_or(0)
}

// ─── FrameSelection ──────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSelection {
    pub start: usize,
    pub end:   usize,
    pub step:  usize,
}

impl Default for FrameSelection {
    fn default() -> Self {
        Self { start: 0, end: 300, step: 5 }
    }
}

impl FrameSelection {
    pub fn new(start: usize, end: usize, step: usize) -> Result<Self> {
        if step == 0 {
            bail!("frame step must be > 0");
        }
        if end <= start {
            bail!("frame selection {start}..{end} is empty");
        }
        Ok(Self { start, end, step })
    }

    /// Number of timesteps every selected sequence has.
    pub fn len(&self) -> usize {
        if self.end <= self.start || self.step == 0 {
            return 0;
        }
        (self.end - self.start).div_ceil(self.step)
    }

    /// Frame indices to read from a clip with `frame_count` frames.
    /// Indices past the end of the clip are clamped to its last frame.
    pub fn indices(&self, frame_count: usize) -> Result<Vec<usize>> {
        if frame_count == 0 {
            bail!("cannot select frames from an empty clip");
        }
        let last = frame_count - 1;
        Ok((self.start..self.end)
            .step_by(self.step.max(1))
            .map(|i| i.min(last))
            .collect())
    }
}
