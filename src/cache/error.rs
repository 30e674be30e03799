use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
/// Errors returned by the prediction cache tiers.
pub enum CacheError {
    /// IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A cache file line could not be decoded.
    #[error("corrupt cache file {path} at line {line}: {reason}")]
    Corrupt {
        path: PathBuf,
        /// 1-based.
        line: usize,
        reason: String,
    },

    /// The cache directory could not be created.
    #[error("cache directory unavailable: {path}")]
    DirectoryUnavailable { path: PathBuf },
}

/// Convenience result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
