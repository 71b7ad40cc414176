pub mod config;
pub use config::{Config, ExportConfig, ProfilingConfig, RecommendationThresholds};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MmProfilerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),
    #[error("Run profiling before exporting report. Call run() first.")]
    NotProfiled,
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MmProfilerError>;
