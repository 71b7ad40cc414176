pub mod audio;
pub mod image;
pub mod numeric;
pub mod text;

pub use audio::{analyze_audio, AudioMetrics};
pub use image::{analyze_image_paths, ImageMetrics};
pub use numeric::{analyze_numeric, NumericMetrics};
pub use text::{analyze_text, tokenize, TextMetrics};

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// `http://` or `https://`, case-insensitive.
pub(crate) fn is_remote(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_half_away_from_zero() {
        assert_eq!(round2(33.3333), 33.33);
        assert_eq!(round2(2.675_1), 2.68);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn remote_prefix_ignores_case() {
        assert!(is_remote("HTTPS://x/y.png"));
        assert!(is_remote("http://x"));
        assert!(!is_remote("ftp://x"));
        assert!(!is_remote("/data/http.png"));
    }
}
