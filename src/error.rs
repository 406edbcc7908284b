//! Error types for huffzip

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("empty input")]
    EmptyInput,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Translation hit a symbol the code table does not know. The table is
    /// always derived from the same text, so this is a logic fault.
    #[error("no code word for symbol {0:?}")]
    MissingCode(char),

    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    #[error("unsupported artifact version {0}")]
    UnsupportedVersion(u8),

    #[error("input too large: {size} bytes exceeds limit of {limit}")]
    InputTooLarge { size: usize, limit: usize },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CompressError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        CompressError::CorruptStream(msg.into())
    }
}
