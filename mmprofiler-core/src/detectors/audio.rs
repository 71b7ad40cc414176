use super::is_remote;
use crate::collaborators::FileSystem;
use crate::dataset::Column;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMetrics {
    pub total: usize,
    pub local_exists: usize,
    /// http(s) references; reachability is not checked
    pub remote_count: usize,
    pub missing_files: usize,
}

pub fn analyze_audio(column: &Column, fs: &dyn FileSystem) -> AudioMetrics {
    let mut m = AudioMetrics { total: column.len(), local_exists: 0, remote_count: 0, missing_files: 0 };
    for v in column.normalized_text() {
        if v.trim().is_empty() {
            m.missing_files += 1;
        } else if is_remote(&v) {
            m.remote_count += 1;
        } else if fs.exists(Path::new(&v)) {
            m.local_exists += 1;
        } else {
            m.missing_files += 1;
        }
    }
    m
}
