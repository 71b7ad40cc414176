//! The profiling orchestrator.
//!
//! `ProfileAggregator` owns a dataset and drives classification, detection,
//! consistency checks and recommendations. Every detector call goes through
//! [`isolate`], so one failing column ends up as `{"error": ...}` in its
//! metric map and the run carries on with the rest.

use crate::classifier::{classify, ColumnOverrides};
use crate::collaborators::{DecodingProbe, Fetcher, FileSystem, HttpFetcher, ImageProbe, LocalFs};
use crate::consistency::check_consistency;
use crate::dataset::{Column, Dataset};
use crate::detectors::{
    analyze_audio, analyze_image_paths, analyze_numeric, analyze_text, is_remote, AudioMetrics,
    ImageMetrics, NumericMetrics, TextMetrics,
};
use crate::profile::{Analysis, Profile, ProfileDraft};
use crate::recommendations::make_recommendations;
use crate::report;
use crate::tabular::{summarize_tabular, ColumnSummary};
use mmprofiler_common::{Config, MmProfilerError, RecommendationThresholds, Result};
use rayon::prelude::*;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ProfilerOptions {
    /// stop resolving image cells once this many paths are collected; None = all
    pub sample_images: Option<usize>,
    /// cap used by the single-column `analyze_images`
    pub column_sample_images: Option<usize>,
    pub download_remote_images: bool,
    pub fetch_timeout: Duration,
    pub thresholds: RecommendationThresholds,
}

impl Default for ProfilerOptions {
    fn default() -> Self {
        Self {
            sample_images: Some(50),
            column_sample_images: Some(200),
            download_remote_images: true,
            fetch_timeout: Duration::from_secs(6),
            thresholds: RecommendationThresholds::default(),
        }
    }
}

impl From<&Config> for ProfilerOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            sample_images: cfg.profiling.sample_images,
            column_sample_images: cfg.profiling.column_sample_images,
            download_remote_images: cfg.profiling.download_remote_images,
            fetch_timeout: Duration::from_secs(cfg.profiling.fetch_timeout_secs),
            thresholds: cfg.recommendations,
        }
    }
}

/// Injected I/O capabilities. Without a fetcher remote images are skipped.
#[derive(Clone)]
pub struct Collaborators {
    pub fs: Arc<dyn FileSystem>,
    pub fetcher: Option<Arc<dyn Fetcher>>,
    pub probe: Arc<dyn ImageProbe>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            fs: Arc::new(LocalFs),
            fetcher: Some(Arc::new(HttpFetcher::new())),
            probe: Arc::new(DecodingProbe),
        }
    }
}

impl Collaborators {
    pub fn offline() -> Self {
        Self { fetcher: None, ..Self::default() }
    }
}

pub struct ProfileAggregator {
    dataset: Dataset,
    options: ProfilerOptions,
    collaborators: Collaborators,
    draft: Option<ProfileDraft>,
    completed: Option<Profile>,
}

impl ProfileAggregator {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            options: ProfilerOptions::default(),
            collaborators: Collaborators::default(),
            draft: None,
            completed: None,
        }
    }

    pub fn with_options(mut self, options: ProfilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    /// Full profiling pass. Replaces the draft and stores the finished profile.
    pub fn run(&mut self, overrides: &ColumnOverrides) -> Profile {
        let cols = classify(&self.dataset, overrides);
        info!(
            rows = self.dataset.row_count(),
            text = cols.text.len(),
            image = cols.image.len(),
            audio = cols.audio.len(),
            numeric = cols.numeric.len(),
            "profiling run started"
        );
        let dataset = &self.dataset;
        let mut draft = ProfileDraft::new(dataset);

        // text and numeric detectors are pure, so they fan out; merge is keyed by name
        let text: Vec<(&str, Analysis<TextMetrics>)> = cols
            .text
            .par_iter()
            .filter_map(|name| dataset.column(name))
            .map(|c| (c.name.as_str(), text_analysis(c)))
            .collect();
        for (name, analysis) in text {
            draft.record_text(name, analysis);
        }

        for column in cols.image.iter().filter_map(|name| dataset.column(name)) {
            let analysis = self.image_analysis(
                column,
                self.options.sample_images,
                self.options.download_remote_images,
            );
            draft.record_images(&column.name, analysis);
        }

        for column in cols.audio.iter().filter_map(|name| dataset.column(name)) {
            draft.record_audio(&column.name, self.audio_analysis(column));
        }

        let numeric: Vec<(&str, Analysis<NumericMetrics>)> = cols
            .numeric
            .par_iter()
            .filter_map(|name| dataset.column(name))
            .map(|c| (c.name.as_str(), numeric_analysis(c)))
            .collect();
        for (name, analysis) in numeric {
            draft.record_numeric(name, analysis);
        }

        draft.set_multimodal(check_consistency(dataset, &cols.text, &cols.image));
        let recs = make_recommendations(&draft.metrics_view(), &self.options.thresholds);
        draft.set_recommendations(recs);

        let profile = draft.finalize();
        info!(
            failed_columns = count_failures(&profile),
            "profiling run finished"
        );
        self.draft = Some(draft);
        self.completed = Some(profile.clone());
        profile
    }

    pub fn analyze_text(&mut self, column: &str) -> Result<Analysis<TextMetrics>> {
        let analysis = text_analysis(self.column(column)?);
        self.draft_mut().record_text(column, analysis.clone());
        Ok(analysis)
    }

    /// Image analysis capped at `column_sample_images` rather than the run cap.
    pub fn analyze_images(&mut self, column: &str) -> Result<Analysis<ImageMetrics>> {
        let (sample, download) = (self.options.column_sample_images, self.options.download_remote_images);
        self.analyze_images_with(column, sample, download)
    }

    pub fn analyze_images_with(
        &mut self,
        column: &str,
        sample_images: Option<usize>,
        download_remote: bool,
    ) -> Result<Analysis<ImageMetrics>> {
        let analysis = self.image_analysis(self.column(column)?, sample_images, download_remote);
        self.draft_mut().record_images(column, analysis.clone());
        Ok(analysis)
    }

    pub fn analyze_audio(&mut self, column: &str) -> Result<Analysis<AudioMetrics>> {
        let analysis = self.audio_analysis(self.column(column)?);
        self.draft_mut().record_audio(column, analysis.clone());
        Ok(analysis)
    }

    pub fn analyze_numeric(&mut self, column: &str) -> Result<Analysis<NumericMetrics>> {
        let analysis = numeric_analysis(self.column(column)?);
        self.draft_mut().record_numeric(column, analysis.clone());
        Ok(analysis)
    }

    /// Per-column dtype/missing/unique overview; numeric summaries are also
    /// merged into the draft.
    pub fn summarize_tabular(&mut self, include_numeric: bool) -> BTreeMap<String, ColumnSummary> {
        let summary = summarize_tabular(&self.dataset, include_numeric);
        let draft = self.draft.get_or_insert_with(|| ProfileDraft::new(&self.dataset));
        for (name, col) in &summary {
            if let Some(numeric) = &col.numeric_summary {
                draft.record_numeric(name, Analysis::Metrics(numeric.clone()));
            }
        }
        summary
    }

    pub fn draft(&self) -> Option<&ProfileDraft> {
        self.draft.as_ref()
    }

    /// The profile produced by the last `run`.
    pub fn profile(&self) -> Result<&Profile> {
        self.completed.as_ref().ok_or(MmProfilerError::NotProfiled)
    }

    pub fn export_html(&self, output: &Path) -> Result<PathBuf> {
        report::write_html_report(self.profile()?, output)?;
        Ok(output.to_path_buf())
    }

    pub fn export_json(&self, output: &Path) -> Result<PathBuf> {
        report::export_json(self.profile()?, output)?;
        Ok(output.to_path_buf())
    }

    fn column(&self, name: &str) -> Result<&Column> {
        self.dataset
            .column(name)
            .ok_or_else(|| MmProfilerError::UnknownColumn(name.to_owned()))
    }

    fn draft_mut(&mut self) -> &mut ProfileDraft {
        self.draft.get_or_insert_with(|| ProfileDraft::new(&self.dataset))
    }

    fn audio_analysis(&self, column: &Column) -> Analysis<AudioMetrics> {
        let fs = self.collaborators.fs.as_ref();
        isolate(&column.name, || Ok(analyze_audio(column, fs)))
    }

    fn image_analysis(
        &self,
        column: &Column,
        sample_images: Option<usize>,
        download_remote: bool,
    ) -> Analysis<ImageMetrics> {
        isolate(&column.name, || {
            // scratch dir (if any) is removed when `resolved` drops, unwinding included
            let resolved = self.resolve_image_paths(column, sample_images, download_remote)?;
            Ok(analyze_image_paths(
                &resolved.paths,
                self.collaborators.fs.as_ref(),
                self.collaborators.probe.as_ref(),
            ))
        })
    }

    /// Turn raw image cells into local paths, downloading remote ones into a
    /// private scratch directory when allowed.
    fn resolve_image_paths(
        &self,
        column: &Column,
        sample_images: Option<usize>,
        download_remote: bool,
    ) -> Result<ResolvedImages> {
        let mut resolved = ResolvedImages { paths: Vec::new(), scratch: None };
        let fetcher = self.collaborators.fetcher.as_deref().filter(|_| download_remote);

        for (row, value) in column.normalized_text().iter().enumerate() {
            if sample_images.is_some_and(|cap| resolved.paths.len() >= cap) {
                break;
            }
            if value.trim().is_empty() {
                continue;
            }
            if is_remote(value) {
                let Some(fetcher) = fetcher else { continue };
                match fetcher.fetch(value, self.options.fetch_timeout) {
                    Ok(bytes) => {
                        let path = resolved.scratch_dir()?.join(remote_file_name(row, value));
                        match std::fs::write(&path, bytes) {
                            Ok(()) => resolved.paths.push(path),
                            Err(e) => debug!(url = %value, error = %e, "could not store fetched image"),
                        }
                    }
                    Err(e) => debug!(url = %value, error = %e, "skipping remote image"),
                }
            } else if self.collaborators.fs.exists(Path::new(value)) {
                resolved.paths.push(PathBuf::from(value));
            }
        }
        Ok(resolved)
    }
}

struct ResolvedImages {
    paths: Vec<PathBuf>,
    scratch: Option<TempDir>,
}

impl ResolvedImages {
    fn scratch_dir(&mut self) -> Result<&Path> {
        if self.scratch.is_none() {
            self.scratch = Some(tempfile::Builder::new().prefix("mmprofiler_").tempdir()?);
        }
        match &self.scratch {
            Some(dir) => Ok(dir.path()),
            None => Err(MmProfilerError::Other("scratch directory unavailable".into())),
        }
    }
}

/// `img_<row><ext>`, extension from the URL path, `.jpg` when there is none.
fn remote_file_name(row: usize, url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    let ext = Path::new(without_query)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_else(|| ".jpg".to_owned());
    format!("img_{row}{ext}")
}

fn text_analysis(column: &Column) -> Analysis<TextMetrics> {
    isolate(&column.name, || Ok(analyze_text(column)))
}

fn numeric_analysis(column: &Column) -> Analysis<NumericMetrics> {
    isolate(&column.name, || Ok(analyze_numeric(column)))
}

/// Run one detector call, turning an error or a panic into an error entry.
pub fn isolate<T>(column: &str, detector: impl FnOnce() -> Result<T>) -> Analysis<T> {
    match panic::catch_unwind(AssertUnwindSafe(detector)) {
        Ok(Ok(metrics)) => Analysis::Metrics(metrics),
        Ok(Err(e)) => {
            warn!(column, error = %e, "detector failed");
            Analysis::failed(e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(column, error = %message, "detector panicked");
            Analysis::failed(message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "detector panicked".to_owned()
    }
}

fn count_failures(profile: &Profile) -> usize {
    profile.text.values().filter(|a| a.is_error()).count()
        + profile.images.values().filter(|a| a.is_error()).count()
        + profile.audio.values().filter(|a| a.is_error()).count()
        + profile.numeric.values().filter(|a| a.is_error()).count()
}
