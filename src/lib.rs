//! huffzip: static Huffman compression for text.
//!
//! Pipeline:
//! - Frequency counting over the characters of the input
//! - Deterministic Huffman tree construction
//! - Code table generation and bit translation
//! - Bit packing behind an 8-bit padding header
//! - A versioned artifact holding the tree followed by the packed bytes
//!
//! Outputs on disk are written through a temporary file and renamed into
//! place, so a failed run never leaves a partial file behind.

pub mod artifact;
pub mod bitpack;
pub mod codec;
pub mod codes;
pub mod config;
pub mod error;
pub mod frequency;
pub mod huffman;

use crate::artifact::Artifact;
use crate::config::CompressionConfig;
use crate::error::CompressError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Compressed output container
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CompressedOutput {
    /// Input size in bytes (UTF-8).
    pub original_size: usize,
    /// Input length in characters.
    pub symbol_count: usize,
    pub compressed_size: usize,
    /// The full artifact: tree followed by packed payload.
    pub data: Vec<u8>,
    pub ratio: f64,
    pub metadata: CompressionMetadata,
}

/// Metadata about the compression process
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CompressionMetadata {
    /// Shannon entropy of the input, bits per character
    pub entropy_bits: f64,
    pub alphabet_size: usize,
    pub payload_bits: usize,
    pub padding_bits: u8,
}

/// The main compressor engine
pub struct Compressor {
    config: CompressionConfig,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(CompressionConfig::default())
    }
}

impl Compressor {
    /// Create a new compressor with the given configuration
    pub fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Compress text into an artifact. Empty text is rejected.
    pub fn compress(&self, text: &str) -> Result<CompressedOutput, CompressError> {
        if text.is_empty() {
            return Err(CompressError::EmptyInput);
        }
        self.check_size(text.len())?;

        let encoded = codec::encode(text)?;
        let metadata = CompressionMetadata {
            entropy_bits: encoded.frequencies.entropy_bits(),
            alphabet_size: encoded.frequencies.len(),
            payload_bits: encoded.payload_bits,
            padding_bits: encoded.padding,
        };
        let symbol_count = encoded.frequencies.total() as usize;
        let data = Artifact::new(encoded.tree, encoded.packed).to_bytes()?;

        Ok(CompressedOutput {
            original_size: text.len(),
            symbol_count,
            compressed_size: data.len(),
            ratio: data.len() as f64 / text.len() as f64,
            data,
            metadata,
        })
    }

    /// Decompress an artifact produced by [`Compressor::compress`].
    pub fn decompress(&self, data: &[u8]) -> Result<String, CompressError> {
        self.check_size(data.len())?;
        let artifact = Artifact::from_bytes(data)?;
        debug!(
            leaves = artifact.tree.leaf_count(),
            payload_bytes = artifact.payload.len(),
            "parsed artifact"
        );
        codec::decode(&artifact.tree, &artifact.payload)
    }

    /// Compress a text file next to itself and return the artifact path.
    pub fn compress_file(&self, input: &Path) -> Result<PathBuf, CompressError> {
        self.check_size(file_len(input)?)?;
        let text = std::fs::read_to_string(input)?;
        let output = self.config.compressed_path(input);

        let compressed = self.compress(&text)?;
        write_atomic(&output, &compressed.data)?;
        info!(
            input = %input.display(),
            output = %output.display(),
            original_size = compressed.original_size,
            compressed_size = compressed.compressed_size,
            "compressed file"
        );
        Ok(output)
    }

    /// Decompress an artifact file next to itself and return the text path.
    pub fn decompress_file(&self, input: &Path) -> Result<PathBuf, CompressError> {
        self.check_size(file_len(input)?)?;
        let data = std::fs::read(input)?;
        let output = self.config.decompressed_path(input);

        let text = self.decompress(&data)?;
        write_atomic(&output, text.as_bytes())?;
        info!(
            input = %input.display(),
            output = %output.display(),
            decompressed_size = text.len(),
            "decompressed file"
        );
        Ok(output)
    }

    fn check_size(&self, size: usize) -> Result<(), CompressError> {
        let limit = self.config.max_input_size;
        if size > limit {
            return Err(CompressError::InputTooLarge { size, limit });
        }
        Ok(())
    }
}

fn file_len(path: &Path) -> Result<usize, CompressError> {
    let len = std::fs::metadata(path)?.len();
    Ok(usize::try_from(len).unwrap_or(usize::MAX))
}

/// Write `bytes` to a temp file beside `path`, then rename it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CompressError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| CompressError::IoError(e.error))?;
    Ok(())
}
