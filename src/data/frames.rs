// ============================================================
// Layer 4 — Raw Frame Dataset
// ============================================================
// Flattens a list of clips into one item per frame, in clip order
// then frame order. That order is the row order of the encoded
// feature matrix, so SequenceDataset can find a clip's rows from
// the running frame offset alone.
//
// Frames are decoded lazily, one batch at a time, because a full
// training split does not fit in memory as f32 pixels.

use anyhow::{Context, Result};
use burn::{data::dataset::Dataset, prelude::*};
use image::{imageops::FilterType, ImageReader};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::domain::clip::ClipRecord;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD:  [f32; 3] = [0.229, 0.224, 0.225];

/// One frame on disk and the label of the clip it belongs to.
#[derive(Debug, Clone)]
pub struct FrameItem {
    pub path:  PathBuf,
    pub label: usize,
}

pub struct FrameDataset {
    items: Vec<FrameItem>,
}

impl FrameDataset {
    pub fn from_clips(clips: &[ClipRecord]) -> Self {
        let items = clips
            .iter()
            .flat_map(|clip| {
                clip.frames.iter().map(move |path| FrameItem {
                    path:  path.clone(),
                    label: clip.label,
                })
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[FrameItem] {
        &self.items
    }
}

impl Dataset<FrameItem> for FrameDataset {
    fn get(&self, index: usize) -> Option<FrameItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Decode one frame into a normalised CHW buffer of `3 * size * size` floats.
pub fn load_frame(path: &Path, size: usize) -> Result<Vec<f32>> {
    let img = ImageReader::open(path)
        .with_context(|| format!("Cannot open frame '{}'", path.display()))?
        .decode()
        .with_context(|| format!("Cannot decode frame '{}'", path.display()))?
        .resize_exact(size as u32, size as u32, FilterType::Triangle)
        .to_rgb8();

    let plane = size * size;
    let mut chw = vec![0.0f32; 3 * plane];
    for (x, y, pixel) in img.enumerate_pixels() {
        let offset = y as usize * size + x as usize;
        for c in 0..3 {
            chw[c * plane + offset] =
                (pixel[c] as f32 / 255.0 - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
        }
    }
    Ok(chw)
}

// ─── FrameBatch ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct FrameBatch<B: Backend> {
    /// [batch_size, 3, size, size]
    pub images: Tensor<B, 4>,
    /// [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

/// Decodes frames in parallel and stacks them into a FrameBatch.
///
/// Unlike SequenceBatcher this is fallible: a frame that cannot be
/// read aborts the encoding pass instead of silently dropping a row.
#[derive(Clone, Debug)]
pub struct FrameBatcher<B: Backend> {
    image_size: usize,
    device:     B::Device,
}

impl<B: Backend> FrameBatcher<B> {
    pub fn new(image_size: usize, device: B::Device) -> Self {
        Self { image_size, device }
    }

    pub fn batch(&self, items: &[FrameItem]) -> Result<FrameBatch<B>> {
        let size = self.image_size;

        // collect() on an indexed parallel iterator keeps input order
        let pixels: Vec<Vec<f32>> = items
            .par_iter()
            .map(|item| load_frame(&item.path, size))
            .collect::<Result<_>>()?;

        let batch_size = items.len();
        let flat: Vec<f32> = pixels.into_iter().flatten().collect();
        let images = Tensor::<B, 4>::from_data(
            TensorData::new(flat, [batch_size, 3, size, size]),
            &self.device,
        );

        let labels: Vec<i32> = items.iter().map(|i| i.label as i32).collect();
        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        Ok(FrameBatch { images, labels })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn write_png(path: &Path, rgb: [u8; 3]) {
        let img = image::RgbImage::from_pixel(8, 6, image::Rgb(rgb));
        img.save(path).unwrap();
    }

    #[test]
    fn test_frames_flatten_in_clip_order() {
        let clips = vec![
            ClipRecord::new("a", 0, vec!["a0.png".into(), "a1.png".into()]),
            ClipRecord::new("b", 3, vec!["b0.png".into()]),
        ];
        let ds = FrameDataset::from_clips(&clips);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.get(2).unwrap().path, PathBuf::from("b0.png"));
        assert_eq!(ds.get(2).unwrap().label, 3);
        assert!(ds.get(3).is_none());
    }

    #[test]
    fn test_load_frame_resizes_and_normalises() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("white.png");
        write_png(&path, [255, 255, 255]);

        let chw = load_frame(&path, 4).unwrap();
        assert_eq!(chw.len(), 3 * 4 * 4);
        let expected_r = (1.0 - IMAGENET_MEAN[0]) / IMAGENET_STD[0];
        assert!((chw[0] - expected_r).abs() < 1e-5);
    }

    #[test]
    fn test_batcher_shapes_and_missing_frame() {
        let dir = tempfile::tempdir().unwrap();
        let p0  = dir.path().join("0.png");
        let p1  = dir.path().join("1.png");
        write_png(&p0, [10, 20, 30]);
        write_png(&p1, [40, 50, 60]);

        let device  = Default::default();
        let batcher = FrameBatcher::<NdArray>::new(5, device);
        let items   = vec![
            FrameItem { path: p0, label: 1 },
            FrameItem { path: p1, label: 2 },
        ];
        let batch = batcher.batch(&items).unwrap();
        assert_eq!(batch.images.dims(), [2, 3, 5, 5]);
        assert_eq!(batch.labels.dims(), [2]);

        let missing = vec![FrameItem { path: dir.path().join("nope.png"), label: 0 }];
        assert!(batcher.batch(&missing).is_err());
    }
}
