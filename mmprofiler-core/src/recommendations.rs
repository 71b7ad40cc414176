use crate::consistency::ConsistencyMetrics;
use crate::detectors::{AudioMetrics, ImageMetrics, NumericMetrics, TextMetrics};
use crate::profile::{Analysis, MetricMap};
use mmprofiler_common::RecommendationThresholds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const OK: &str = "OK.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub text: BTreeMap<String, Vec<String>>,
    pub images: BTreeMap<String, Vec<String>>,
    pub multimodal: Vec<String>,
    pub numeric: BTreeMap<String, Vec<String>>,
    pub audio: BTreeMap<String, Vec<String>>,
}

/// Everything the rules look at. Borrowed from a profile draft; detectors are
/// never re-run here.
pub struct MetricsView<'a> {
    pub text: &'a MetricMap<TextMetrics>,
    pub images: &'a MetricMap<ImageMetrics>,
    pub audio: &'a MetricMap<AudioMetrics>,
    pub numeric: &'a MetricMap<NumericMetrics>,
    pub multimodal: &'a ConsistencyMetrics,
}

pub fn make_recommendations(metrics: &MetricsView<'_>, t: &RecommendationThresholds) -> Recommendations {
    Recommendations {
        text: per_column(metrics.text, "cannot analyze text column (error)", |m| text_flags(m, t)),
        images: per_column(metrics.images, "cannot analyze image column (error)", image_flags),
        multimodal: multimodal_flags(metrics.multimodal, t),
        numeric: metrics
            .numeric
            .iter()
            .filter_map(|(col, a)| {
                let flags = numeric_flags(a.metrics()?, t);
                (!flags.is_empty()).then(|| (col.clone(), flags))
            })
            .collect(),
        audio: per_column(metrics.audio, "cannot analyze audio column (error)", audio_flags),
    }
}

/// One entry per analysed column: the error note, the raised flags, or `OK`.
fn per_column<T>(
    map: &MetricMap<T>,
    error_note: &str,
    flags: impl Fn(&T) -> Vec<String>,
) -> BTreeMap<String, Vec<String>> {
    map.iter()
        .map(|(col, analysis)| {
            let notes = match analysis {
                Analysis::Error { .. } => vec![error_note.to_owned()],
                Analysis::Metrics(m) => {
                    let raised = flags(m);
                    if raised.is_empty() {
                        vec![OK.to_owned()]
                    } else {
                        raised
                    }
                }
            };
            (col.clone(), notes)
        })
        .collect()
}

fn text_flags(m: &TextMetrics, t: &RecommendationThresholds) -> Vec<String> {
    let mut out = Vec::new();
    if m.empty_rows > 0 {
        out.push(format!(
            "{} empty rows: consider filling or dropping them.",
            m.empty_rows
        ));
    }
    if m.avg_length < t.min_avg_text_length {
        out.push(format!(
            "Average length is short (<{}): consider extra features.",
            t.min_avg_text_length
        ));
    }
    out
}

fn image_flags(m: &ImageMetrics) -> Vec<String> {
    let mut out = Vec::new();
    if m.missing_files > 0 {
        out.push(format!("{} files missing from the sample.", m.missing_files));
    }
    if m.valid_files == 0 {
        out.push("No valid images in the sample: check URLs/paths or raise sample_images.".into());
    }
    out
}

fn multimodal_flags(m: &ConsistencyMetrics, t: &RecommendationThresholds) -> Vec<String> {
    let mut out = Vec::new();
    if m.missing_modalities_percent > 0.0 {
        out.push("Some records are missing every modality: define a policy for gaps.".to_owned());
    }
    if let Some(dist) = &m.label_distribution {
        let max = dist.values().copied().max().unwrap_or(0);
        let min = dist.values().copied().min().unwrap_or(0).max(1);
        if dist.len() > 1 && max as f64 / min as f64 > t.max_class_imbalance_ratio {
            out.push("Strong class imbalance: consider resampling or class weights.".to_owned());
        }
    }
    out
}

/// High missingness takes precedence; skew is only reported otherwise.
fn numeric_flags(m: &NumericMetrics, t: &RecommendationThresholds) -> Vec<String> {
    if m.missing_percent > t.max_missing_percent {
        vec![format!("High share of missing values (>{}%).", t.max_missing_percent)]
    } else if m.skew.is_some_and(|s| s.abs() > t.max_abs_skew) {
        vec![format!(
            "Strongly skewed distribution (|skew|>{}): consider a log transform.",
            t.max_abs_skew
        )]
    } else {
        Vec::new()
    }
}

fn audio_flags(m: &AudioMetrics) -> Vec<String> {
    if m.missing_files > 0 {
        vec![format!("{} audio files missing.", m.missing_files)]
    } else {
        Vec::new()
    }
}
