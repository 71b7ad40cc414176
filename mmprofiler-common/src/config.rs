use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilingConfig {
    #[serde(default = "default_sample_images")]
    pub sample_images: Option<usize>, // None = resolve every image cell
    #[serde(default = "default_column_sample_images")]
    pub column_sample_images: Option<usize>, // single-column analyze_images
    #[serde(default = "default_true")]
    pub download_remote_images: bool,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_sample_images() -> Option<usize> {
    Some(50)
}
fn default_column_sample_images() -> Option<usize> {
    Some(200)
}
fn default_true() -> bool {
    true
}
fn default_fetch_timeout() -> u64 {
    6
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            sample_images: default_sample_images(),
            column_sample_images: default_column_sample_images(),
            download_remote_images: true,
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

/// Cut-offs used when turning metrics into advisories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationThresholds {
    /// text columns with a shorter average length get flagged
    #[serde(default = "default_min_avg_text_length")]
    pub min_avg_text_length: f64,
    #[serde(default = "default_max_missing_percent")]
    pub max_missing_percent: f64,
    /// max/min label count ratio above which classes count as imbalanced
    #[serde(default = "default_max_class_imbalance_ratio")]
    pub max_class_imbalance_ratio: f64,
    #[serde(default = "default_max_abs_skew")]
    pub max_abs_skew: f64,
}

fn default_min_avg_text_length() -> f64 {
    20.0
}
fn default_max_missing_percent() -> f64 {
    30.0
}
fn default_max_class_imbalance_ratio() -> f64 {
    8.0
}
fn default_max_abs_skew() -> f64 {
    2.0
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            min_avg_text_length: default_min_avg_text_length(),
            max_missing_percent: default_max_missing_percent(),
            max_class_imbalance_ratio: default_max_class_imbalance_ratio(),
            max_abs_skew: default_max_abs_skew(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_report_name")]
    pub report_name: String,
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_report_name() -> String {
    "report.html".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            report_name: default_report_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub profiling: ProfilingConfig,
    #[serde(default)]
    pub recommendations: RecommendationThresholds,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mmprofiler")
            .join("config.toml")
    }

    pub fn load() -> crate::Result<Self> {
        let path = if let Ok(env_path) = std::env::var("MMPROFILER_CONFIG") {
            PathBuf::from(env_path) // $MMPROFILER_CONFIG overrides default config path
        } else {
            Self::config_path()
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::MmProfilerError::Config(e.to_string()))
    }

    pub fn report_path(&self) -> PathBuf {
        Path::new(&self.export.output_dir).join(&self.export.report_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.profiling.sample_images, Some(50));
        assert!(cfg.profiling.download_remote_images);
        assert_eq!(cfg.recommendations, RecommendationThresholds::default());
    }

    #[test]
    fn partial_tables_fill_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[profiling]\nfetch_timeout_secs = 2\n\n[recommendations]\nmax_abs_skew = 1.5\n",
        )
        .unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.profiling.fetch_timeout_secs, 2);
        assert_eq!(cfg.profiling.sample_images, Some(50));
        assert_eq!(cfg.profiling.column_sample_images, Some(200));
        assert_eq!(cfg.recommendations.max_abs_skew, 1.5);
        assert_eq!(cfg.recommendations.min_avg_text_length, 20.0);
        assert_eq!(cfg.export.report_name, "report.html");
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[profiling\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, crate::MmProfilerError::Config(_)));
    }
}
