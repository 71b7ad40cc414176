pub mod aggregator;
pub mod classifier;
pub mod collaborators;
pub mod consistency;
pub mod dataset;
pub mod detectors;
pub mod loader;
pub mod profile;
pub mod recommendations;
pub mod report;
pub mod tabular;

pub use aggregator::{isolate, Collaborators, ProfileAggregator, ProfilerOptions};
pub use classifier::{classify, ColumnOverrides, ModalityColumns};
pub use collaborators::{
    DecodingProbe, Fetcher, FileSystem, HttpFetcher, ImageInfo, ImageProbe, LocalFs,
};
pub use consistency::{check_consistency, ConsistencyMetrics};
pub use dataset::{Cell, Column, Dataset, Modality};
pub use detectors::{
    analyze_audio, analyze_image_paths, analyze_numeric, analyze_text, AudioMetrics, ImageMetrics,
    NumericMetrics, TextMetrics,
};
pub use loader::load_dataset;
pub use mmprofiler_common::{MmProfilerError, Result};
pub use profile::{Analysis, General, MetricMap, Profile, ProfileDraft};
pub use recommendations::{make_recommendations, Recommendations};
pub use report::{export_json, print_summary, render_html, write_html_report};
pub use tabular::{summarize_tabular, ColumnSummary};
