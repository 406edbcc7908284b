//! Configuration for huffzip

use crate::error::CompressError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Extension stripped from text inputs when naming the artifact.
    pub text_extension: String,
    pub compressed_suffix: String,
    pub decompressed_suffix: String,
    /// Upper bound in bytes for both text inputs and artifacts.
    pub max_input_size: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            text_extension: ".txt".to_string(),
            compressed_suffix: "_compressed.bin".to_string(),
            decompressed_suffix: "_decompressed.txt".to_string(),
            max_input_size: 100 * 1024 * 1024, // 100 MB
        }
    }
}

impl CompressionConfig {
    /// Load a JSON configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, CompressError> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| CompressError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// `notes.txt` becomes `notes_compressed.bin` in the same directory.
    pub fn compressed_path(&self, input: &Path) -> PathBuf {
        let stem = strip_name_suffix(input, &self.text_extension);
        input.with_file_name(format!("{}{}", stem, self.compressed_suffix))
    }

    /// `notes_compressed.bin` becomes `notes_decompressed.txt` in the same directory.
    pub fn decompressed_path(&self, input: &Path) -> PathBuf {
        let stem = strip_name_suffix(input, &self.compressed_suffix);
        input.with_file_name(format!("{}{}", stem, self.decompressed_suffix))
    }
}

fn strip_name_suffix(path: &Path, suffix: &str) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(suffix) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}
