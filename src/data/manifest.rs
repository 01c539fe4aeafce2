// ============================================================
// Layer 4 — Clip and Pose Manifests
// ============================================================
// A clip manifest is either
//
//   1. a JSON file:
//        [ { "id": "clip_0001", "label": 2,
//            "frames": ["clip_0001/000.jpg", "clip_0001/001.jpg", ...] } ]
//      relative frame paths are resolved against the JSON file's directory
//
//   2. a directory tree laid out as <root>/<label>/<clip>/<frame image>
//      where <label> is an integer class index. Clips and frames are
//      sorted by file name so the order is stable between runs.
//
// The pose manifest is always JSON:
//        [ { "id": "clip_0001", "frames": [[x0, y0, x1, y1, ...], ...] } ]

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::domain::clip::ClipRecord;
use crate::domain::traits::ClipSource;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tif"];

/// A clip manifest on disk.
pub struct ClipManifest {
    path: PathBuf,
}

impl ClipManifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ClipSource for ClipManifest {
    fn load_clips(&self) -> Result<Vec<ClipRecord>> {
        let clips = if self.path.is_dir() {
            load_from_tree(&self.path)?
        } else {
            load_from_json(&self.path)?
        };

        tracing::info!(
            "Loaded {} clips ({} frames) from '{}'",
            clips.len(),
            clips.iter().map(ClipRecord::frame_count).sum::<usize>(),
            self.path.display()
        );
        Ok(clips)
    }
}

fn load_from_json(path: &Path) -> Result<Vec<ClipRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read clip manifest '{}'", path.display()))?;
    let mut clips: Vec<ClipRecord> = serde_json::from_str(&text)
        .with_context(|| format!("Malformed clip manifest '{}'", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for clip in &mut clips {
        for frame in &mut clip.frames {
            if frame.is_relative() {
                *frame = base.join(&*frame);
            }
        }
    }
    Ok(clips)
}

fn load_from_tree(root: &Path) -> Result<Vec<ClipRecord>> {
    let mut clips = Vec::new();

    for label_dir in sorted_entries(root)? {
        if !label_dir.is_dir() {
            continue;
        }
        let name  = file_name(&label_dir);
        let label = match name.parse::<usize>() {
            Ok(label) => label,
            Err(_) => {
                tracing::warn!("Skipping '{}': label directories must be integers", label_dir.display());
                continue;
            }
        };

        for clip_dir in sorted_entries(&label_dir)? {
            if !clip_dir.is_dir() {
                continue;
            }
            let frames: Vec<PathBuf> = sorted_entries(&clip_dir)?
                .into_iter()
                .filter(|p| is_image(p))
                .collect();
            if frames.is_empty() {
                tracing::warn!("Skipping '{}': no frames", clip_dir.display());
                continue;
            }
            clips.push(ClipRecord::new(file_name(&clip_dir), label, frames));
        }
    }

    if clips.is_empty() {
        bail!("No clips found under '{}'", root.display());
    }
    Ok(clips)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

// ─── PoseTable ────────────────────────────────────────────────────────────────
#[derive(Deserialize)]
struct PoseEntry {
    id:     String,
    frames: Vec<Vec<f32>>,
}

/// Per-frame pose vectors keyed by clip id.
#[derive(Debug, Clone)]
pub struct PoseTable {
    dim:   usize,
    clips: HashMap<String, Vec<Vec<f32>>>,
}

impl PoseTable {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read pose manifest '{}'", path.display()))?;
        let entries: Vec<PoseEntry> = serde_json::from_str(&text)
            .with_context(|| format!("Malformed pose manifest '{}'", path.display()))?;
        let table = Self::from_entries(entries.into_iter().map(|e| (e.id, e.frames)))?;
        tracing::info!(
            "Loaded pose vectors (dim {}) for {} clips from '{}'",
            table.dim, table.clips.len(), path.display()
        );
        Ok(table)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<Vec<f32>>)>) -> Result<Self> {
        let mut dim   = None;
        let mut clips = HashMap::new();

        for (id, frames) in entries {
            if frames.is_empty() {
                bail!("Pose entry '{id}' has no frames");
            }
            for v in &frames {
                match dim {
                    None => dim = Some(v.len()),
                    Some(d) if d != v.len() => {
                        bail!("Pose entry '{id}' has width {} but expected {d}", v.len())
                    }
                    _ => {}
                }
            }
            clips.insert(id, frames);
        }

        Ok(Self { dim: dim.unwrap_or(0), clips })
    }

    /// Width of every pose vector.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Pose vector for frame `index` of clip `id`, clamped to the clip's last frame.
    pub fn frame(&self, id: &str, index: usize) -> Result<&[f32]> {
        let frames = self
            .clips
            .get(id)
            .with_context(|| format!("No pose data for clip '{id}'"))?;
        let index = index.min(frames.len() - 1);
        Ok(&frames[index])
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_manifest_resolves_relative_frames() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.json");
        fs::write(
            &path,
            r#"[{"id": "c1", "label": 1, "frames": ["c1/a.jpg", "/abs/b.jpg"]}]"#,
        ).unwrap();

        let clips = ClipManifest::new(&path).load_clips().unwrap();
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].label, 1);
        assert_eq!(clips[0].frames[0], dir.path().join("c1/a.jpg"));
        assert_eq!(clips[0].frames[1], PathBuf::from("/abs/b.jpg"));
    }

    #[test]
    fn test_directory_tree_is_sorted_and_labelled() {
        let dir = tempfile::tempdir().unwrap();
        for (label, clip, frame) in [("1", "b", "002.png"), ("1", "b", "001.png"),
                                     ("0", "a", "000.jpg"), ("1", "b", "notes.txt")] {
            let clip_dir = dir.path().join(label).join(clip);
            fs::create_dir_all(&clip_dir).unwrap();
            fs::write(clip_dir.join(frame), b"").unwrap();
        }
        fs::create_dir_all(dir.path().join("misc")).unwrap();

        let clips = ClipManifest::new(dir.path()).load_clips().unwrap();
        assert_eq!(clips.len(), 2);
        assert_eq!((clips[0].id.as_str(), clips[0].label), ("a", 0));
        assert_eq!((clips[1].id.as_str(), clips[1].label), ("b", 1));
        let names: Vec<String> = clips[1].frames.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["001.png", "002.png"]);
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        assert!(ClipManifest::new("/nonexistent/manifest.json").load_clips().is_err());
    }

    #[test]
    fn test_pose_table_width_and_clamping() {
        let table = PoseTable::from_entries(vec![
            ("c1".to_string(), vec![vec![0.0, 1.0], vec![2.0, 3.0]]),
        ]).unwrap();
        assert_eq!(table.dim(), 2);
        assert_eq!(table.frame("c1", 7).unwrap(), &[2.0, 3.0]);
        assert!(table.frame("missing", 0).is_err());

        let ragged = PoseTable::from_entries(vec![
            ("c1".to_string(), vec![vec![0.0, 1.0], vec![2.0]]),
        ]);
        assert!(ragged.is_err());
    }
}
