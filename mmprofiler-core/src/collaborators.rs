//! Seams to the outside world: filesystem probes, network fetch and image
//! decoding. The orchestrator only talks to these traits so tests can swap in
//! in-memory fakes.

use image::GenericImageView;
use mmprofiler_common::{MmProfilerError, Result};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
}

/// `std::fs` backed filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }
}

pub trait Fetcher: Send + Sync {
    /// Single attempt; no retries.
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>>;
}

/// The blocking client is built on the first fetch, so offline runs never
/// start its runtime thread.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: OnceLock<reqwest::blocking::Client>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> &reqwest::blocking::Client {
        self.client.get_or_init(reqwest::blocking::Client::new)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        let fetch_err = |e: reqwest::Error| MmProfilerError::Fetch {
            url: url.to_owned(),
            reason: e.to_string(),
        };
        let resp = self
            .client()
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(fetch_err)?
            .error_for_status()
            .map_err(fetch_err)?;
        let bytes = resp.bytes().map_err(fetch_err)?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub mean_brightness: f64,
}

pub trait ImageProbe: Send + Sync {
    fn probe(&self, bytes: &[u8]) -> Result<ImageInfo>;
}

/// Decodes with the `image` crate. Brightness is the mean over every channel
/// value of the decoded pixel buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodingProbe;

impl ImageProbe for DecodingProbe {
    fn probe(&self, bytes: &[u8]) -> Result<ImageInfo> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| MmProfilerError::Decode(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| MmProfilerError::Decode("unrecognised image format".into()))?;
        let img = reader
            .decode()
            .map_err(|e| MmProfilerError::Decode(e.to_string()))?;
        let (width, height) = img.dimensions();
        let color = img.color();
        // 8-bit buffers are averaged as stored; wider ones are reduced to rgb8 first
        let mean_brightness = if color.bytes_per_pixel() == color.channel_count() {
            mean_u8(img.as_bytes())
        } else {
            mean_u8(img.to_rgb8().as_raw())
        };
        Ok(ImageInfo {
            format: format_name(format),
            width,
            height,
            mean_brightness,
        })
    }
}

fn mean_u8(buf: &[u8]) -> f64 {
    if buf.is_empty() {
        return 0.0;
    }
    buf.iter().map(|&b| b as u64).sum::<u64>() as f64 / buf.len() as f64
}

fn format_name(format: image::ImageFormat) -> String {
    format
        .extensions_str()
        .first()
        .map(|ext| match *ext {
            "jpg" => "JPEG".to_owned(),
            "tif" => "TIFF".to_owned(),
            other => other.to_uppercase(),
        })
        .unwrap_or_else(|| format!("{format:?}").to_uppercase())
}
