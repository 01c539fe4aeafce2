// ============================================================
// Layer 2 — Sequence Inputs
// ============================================================
// Joins the three inputs of one split into the dataset the
// sequence model consumes:
//
//   clip manifest   → labels, frame counts, clip ids
//   EncodedFeatures → one feature row per frame
//   pose manifest   → optional per-frame pose vectors
//
// The class count is derived here as well, from every clip the
// run knows about, unless --num-classes overrides it.

use anyhow::{bail, Result};
use burn::prelude::*;

use crate::application::config::RunConfig;
use crate::data::{dataset::SequenceDataset, manifest::{ClipManifest, PoseTable}};
use crate::domain::clip::{class_count, ClipRecord};
use crate::domain::run::Split;
use crate::domain::traits::ClipSource;
use crate::infra::features::EncodedFeatures;

/// Clips of one split plus the sequence dataset built from them.
pub struct SplitInputs {
    pub clips:   Vec<ClipRecord>,
    pub dataset: SequenceDataset,
}

pub fn load_clips(cfg: &RunConfig, split: Split) -> Result<Vec<ClipRecord>> {
    let clips = ClipManifest::new(cfg.image_path(split)?).load_clips()?;
    if clips.is_empty() {
        bail!("the {} clip manifest lists no clips", split.as_str());
    }
    Ok(clips)
}

pub fn load_pose(cfg: &RunConfig, split: Split) -> Result<Option<PoseTable>> {
    cfg.pose_path(split).map(PoseTable::load).transpose()
}

impl SplitInputs {
    pub fn load<B: Backend>(
        cfg:      &RunConfig,
        features: &EncodedFeatures,
        device:   &B::Device,
    ) -> Result<Self> {
        let split   = features.split;
        let clips   = load_clips(cfg, split)?;
        let pose    = load_pose(cfg, split)?;
        let matrix  = features.load::<B>(device)?;
        let dataset = SequenceDataset::from_features(&matrix, &clips, cfg.frame_selection()?, pose.as_ref())?;

        tracing::info!(
            "{} split: {} clips, {} timesteps × {} features",
            split.as_str(), clips.len(), dataset.timesteps(), dataset.feature_dim()
        );
        Ok(Self { clips, dataset })
    }
}

/// `--num-classes` when given, else one more than the largest label seen.
pub fn resolve_num_classes(cfg: &RunConfig, clip_sets: &[&[ClipRecord]]) -> Result<usize> {
    let derived = class_count(clip_sets.iter().flat_map(|clips| clips.iter()));
    match cfg.num_classes {
        Some(n) if n < derived => {
            bail!("--num-classes is {n} but the manifests use labels up to {}", derived - 1)
        }
        Some(n) => Ok(n),
        None    => Ok(derived),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::data::dataset::Dataset;
    use std::path::PathBuf;

    fn write_manifest(dir: &std::path::Path, name: &str, clips: &[(&str, usize, usize)]) -> PathBuf {
        let entries: Vec<ClipRecord> = clips
            .iter()
            .map(|(id, label, frames)| {
                let paths = (0..*frames).map(|f| PathBuf::from(format!("{id}/{f:03}.png"))).collect();
                ClipRecord::new(*id, *label, paths)
            })
            .collect();
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_load_joins_features_and_pose() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let manifest = write_manifest(dir.path(), "train.json", &[("a", 0, 2), ("b", 1, 3)]);
        std::fs::write(
            dir.path().join("pose.json"),
            r#"[{"id":"a","frames":[[1.0],[2.0]]},{"id":"b","frames":[[3.0],[4.0],[5.0]]}]"#,
        ).unwrap();

        // Five frames in manifest order, two features each
        let features = EncodedFeatures::locate(dir.path(), Split::Train);
        let values: Vec<f32> = (0..10).map(|v| v as f32).collect();
        features
            .save(Tensor::<NdArray, 2>::from_data(TensorData::new(values, [5, 2]), &device))
            .unwrap();

        let cfg = RunConfig {
            image_train_path: Some(manifest),
            pose_train_path:  Some(dir.path().join("pose.json")),
            frame_start: 0,
            frame_end:   3,
            frame_step:  1,
            ..RunConfig::default()
        };

        let inputs = SplitInputs::load::<NdArray>(&cfg, &features, &device).unwrap();
        assert_eq!(inputs.dataset.len(), 2);
        assert_eq!(inputs.dataset.timesteps(), 3);
        assert_eq!(inputs.dataset.feature_dim(), 3);

        // Clip "a" has two frames, so its third timestep repeats frame 1
        let a = inputs.dataset.get(0).unwrap();
        assert_eq!(a.features, vec![0.0, 1.0, 1.0, 2.0, 3.0, 2.0, 2.0, 3.0, 2.0]);
        assert_eq!(inputs.dataset.labels().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_num_classes_derived_or_overridden() {
        let train = vec![ClipRecord::new("a", 0, vec![]), ClipRecord::new("b", 4, vec![])];
        let val   = vec![ClipRecord::new("c", 2, vec![])];

        let cfg = RunConfig::default();
        assert_eq!(resolve_num_classes(&cfg, &[&train[..], &val[..]]).unwrap(), 5);

        let wider = RunConfig { num_classes: Some(8), ..RunConfig::default() };
        assert_eq!(resolve_num_classes(&wider, &[&train[..], &val[..]]).unwrap(), 8);

        let narrow = RunConfig { num_classes: Some(3), ..RunConfig::default() };
        assert!(resolve_num_classes(&narrow, &[&train[..], &val[..]]).is_err());
    }

    #[test]
    fn test_empty_manifest_is_an_error() {
        let dir      = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path(), "val.json", &[]);
        let cfg      = RunConfig { image_val_path: Some(manifest), ..RunConfig::default() };
        assert!(load_clips(&cfg, Split::Val).is_err());
    }
}
