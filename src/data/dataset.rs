use anyhow::{bail, Result};
use burn::data::dataset::Dataset;

use crate::data::manifest::PoseTable;
use crate::domain::clip::{ClipRecord, FrameSelection};

/// Host-side copy of an encoded feature matrix: `rows` frames × `dim` features,
/// row-major.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    pub rows:   usize,
    pub dim:    usize,
    pub values: Vec<f32>,
}

impl FeatureMatrix {
    pub fn new(rows: usize, dim: usize, values: Vec<f32>) -> Result<Self> {
        if values.len() != rows * dim {
            bail!("feature matrix has {} values, expected {rows} x {dim}", values.len());
        }
        Ok(Self { rows, dim, values })
    }

    pub fn row(&self, index: usize) -> &[f32] {
        &self.values[index * self.dim..(index + 1) * self.dim]
    }
}

/// One clip as a fixed-length sequence of per-frame feature vectors.
#[derive(Debug, Clone)]
pub struct SequenceItem {
    /// `timesteps * dim` values, timestep-major
    pub features:  Vec<f32>,
    pub timesteps: usize,
    pub dim:       usize,
    pub label:     usize,
}

pub struct SequenceDataset {
    items:     Vec<SequenceItem>,
    timesteps: usize,
    dim:       usize,
}

impl SequenceDataset {
    /// Regroup per-frame features into per-clip sequences.
    ///
    /// `features` must hold one row per frame of `clips`, in clip order then
    /// frame order (the order the encoder wrote them). When `pose` is given,
    /// each selected frame's pose vector is appended to its image features.
    pub fn from_features(
        features:  &FeatureMatrix,
        clips:     &[ClipRecord],
        selection: FrameSelection,
        pose:      Option<&PoseTable>,
    ) -> Result<Self> {
        let total_frames: usize = clips.iter().map(ClipRecord::frame_count).sum();
        if total_frames != features.rows {
            bail!(
                "encoded features have {} rows but the manifest lists {} frames; \
                 re-run with --encode 1",
                features.rows, total_frames
            );
        }

        let timesteps = selection.len();
        let dim       = features.dim + pose.map_or(0, PoseTable::dim);
        let mut items = Vec::with_capacity(clips.len());
        let mut offset = 0;

        for clip in clips {
            let mut values = Vec::with_capacity(timesteps * dim);
            for frame in selection.indices(clip.frame_count())? {
                values.extend_from_slice(features.row(offset + frame));
                if let Some(pose) = pose {
                    values.extend_from_slice(pose.frame(&clip.id, frame)?);
                }
            }
            offset += clip.frame_count();

            items.push(SequenceItem { features: values, timesteps, dim, label: clip.label });
        }

        Ok(Self { items, timesteps, dim })
    }

    pub fn from_items(items: Vec<SequenceItem>) -> Result<Self> {
        let (timesteps, dim) = items.first().map_or((0, 0), |i| (i.timesteps, i.dim));
        if items.iter().any(|i| i.timesteps != timesteps || i.dim != dim) {
            bail!("all sequences must share one shape");
        }
        Ok(Self { items, timesteps, dim })
    }

    pub fn timesteps(&self) -> usize { self.timesteps }

    /// Width of each timestep's feature vector.
    pub fn feature_dim(&self) -> usize { self.dim }

    pub fn labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.items.iter().map(|i| i.label)
    }
}

impl Dataset<SequenceItem> for SequenceDataset {
    fn get(&self, index: usize) -> Option<SequenceItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
