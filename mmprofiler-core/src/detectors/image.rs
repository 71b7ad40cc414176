use super::{mean, round2};
use crate::collaborators::{FileSystem, ImageProbe};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetrics {
    pub valid_files: usize,
    pub missing_files: usize,
    pub broken_files: usize,
    pub formats: BTreeMap<String, usize>,
    pub widths: Vec<u32>,
    pub heights: Vec<u32>,
    pub brightness: Vec<f64>,
    pub min_width: Option<u32>,
    pub max_width: Option<u32>,
    pub avg_width: Option<f64>,
    pub min_height: Option<u32>,
    pub max_height: Option<u32>,
    pub avg_height: Option<f64>,
    pub avg_brightness: Option<f64>,
}

/// Classify every path as valid, missing or broken. Aggregates over an empty
/// valid set are `None`.
pub fn analyze_image_paths(paths: &[PathBuf], fs: &dyn FileSystem, probe: &dyn ImageProbe) -> ImageMetrics {
    let mut valid_files = 0;
    let mut missing_files = 0;
    let mut broken_files = 0;
    let mut formats: BTreeMap<String, usize> = BTreeMap::new();
    let mut widths = Vec::new();
    let mut heights = Vec::new();
    let mut brightness = Vec::new();

    for path in paths {
        if !fs.exists(path) {
            missing_files += 1;
            continue;
        }
        match fs.read(path).and_then(|bytes| probe.probe(&bytes)) {
            Ok(info) => {
                valid_files += 1;
                *formats.entry(info.format).or_insert(0) += 1;
                widths.push(info.width);
                heights.push(info.height);
                brightness.push(info.mean_brightness);
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "image failed to decode");
                broken_files += 1;
            }
        }
    }

    let as_f64 = |v: &[u32]| v.iter().map(|&x| x as f64).collect::<Vec<_>>();
    ImageMetrics {
        valid_files,
        missing_files,
        broken_files,
        formats,
        min_width: widths.iter().copied().min(),
        max_width: widths.iter().copied().max(),
        avg_width: mean(&as_f64(&widths)).map(round2),
        min_height: heights.iter().copied().min(),
        max_height: heights.iter().copied().max(),
        avg_height: mean(&as_f64(&heights)).map(round2),
        avg_brightness: mean(&brightness).map(round2),
        widths,
        heights,
        brightness,
    }
}
