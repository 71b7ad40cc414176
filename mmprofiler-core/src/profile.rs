use crate::consistency::ConsistencyMetrics;
use crate::dataset::Dataset;
use crate::detectors::{AudioMetrics, ImageMetrics, NumericMetrics, TextMetrics};
use crate::recommendations::{MetricsView, Recommendations};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one detector call. A failure serialises as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Analysis<T> {
    Error { error: String },
    Metrics(T),
}

impl<T> Analysis<T> {
    pub fn failed(message: impl Into<String>) -> Self {
        Analysis::Error { error: message.into() }
    }

    pub fn metrics(&self) -> Option<&T> {
        match self {
            Analysis::Metrics(m) => Some(m),
            Analysis::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Analysis::Error { error } => Some(error),
            Analysis::Metrics(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Analysis::Error { .. })
    }
}

pub type MetricMap<T> = BTreeMap<String, Analysis<T>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct General {
    pub total_rows: usize,
    pub columns: Vec<String>,
}

/// Result of a completed profiling run. Never mutated after `finalize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub general: General,
    pub text: MetricMap<TextMetrics>,
    pub images: MetricMap<ImageMetrics>,
    pub audio: MetricMap<AudioMetrics>,
    pub numeric: MetricMap<NumericMetrics>,
    pub multimodal: ConsistencyMetrics,
    pub recommendations: Recommendations,
}

/// Profile under construction. Per-column writes replace earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDraft {
    general: General,
    text: MetricMap<TextMetrics>,
    images: MetricMap<ImageMetrics>,
    audio: MetricMap<AudioMetrics>,
    numeric: MetricMap<NumericMetrics>,
    multimodal: ConsistencyMetrics,
    recommendations: Recommendations,
}

impl ProfileDraft {
    pub fn new(dataset: &Dataset) -> Self {
        Self {
            general: General { total_rows: dataset.row_count(), columns: dataset.column_names() },
            text: MetricMap::new(),
            images: MetricMap::new(),
            audio: MetricMap::new(),
            numeric: MetricMap::new(),
            multimodal: ConsistencyMetrics::default(),
            recommendations: Recommendations::default(),
        }
    }

    pub fn record_text(&mut self, column: &str, analysis: Analysis<TextMetrics>) {
        self.text.insert(column.to_owned(), analysis);
    }
    pub fn record_images(&mut self, column: &str, analysis: Analysis<ImageMetrics>) {
        self.images.insert(column.to_owned(), analysis);
    }
    pub fn record_audio(&mut self, column: &str, analysis: Analysis<AudioMetrics>) {
        self.audio.insert(column.to_owned(), analysis);
    }
    pub fn record_numeric(&mut self, column: &str, analysis: Analysis<NumericMetrics>) {
        self.numeric.insert(column.to_owned(), analysis);
    }
    pub fn set_multimodal(&mut self, metrics: ConsistencyMetrics) {
        self.multimodal = metrics;
    }
    pub fn set_recommendations(&mut self, recs: Recommendations) {
        self.recommendations = recs;
    }

    pub fn text(&self) -> &MetricMap<TextMetrics> {
        &self.text
    }
    pub fn images(&self) -> &MetricMap<ImageMetrics> {
        &self.images
    }
    pub fn audio(&self) -> &MetricMap<AudioMetrics> {
        &self.audio
    }
    pub fn numeric(&self) -> &MetricMap<NumericMetrics> {
        &self.numeric
    }

    pub fn metrics_view(&self) -> MetricsView<'_> {
        MetricsView {
            text: &self.text,
            images: &self.images,
            audio: &self.audio,
            numeric: &self.numeric,
            multimodal: &self.multimodal,
        }
    }

    /// Immutable snapshot of the current state.
    pub fn finalize(&self) -> Profile {
        Profile {
            general: self.general.clone(),
            text: self.text.clone(),
            images: self.images.clone(),
            audio: self.audio.clone(),
            numeric: self.numeric.clone(),
            multimodal: self.multimodal.clone(),
            recommendations: self.recommendations.clone(),
        }
    }
}
