use thiserror::Error;

/// Errors returned by chunking and relevance selection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TextError {
    /// Chunk size must be at least one character.
    #[error("invalid argument: max_chars must be positive, got {max_chars}")]
    ZeroChunkSize { max_chars: usize },

    /// Keep ratio must lie in `[0, 1]`.
    #[error("invalid argument: keep_ratio must be between 0.0 and 1.0, got {keep_ratio}")]
    KeepRatioOutOfRange { keep_ratio: f64 },
}

/// Convenience result type for text operations.
pub type TextResult<T> = Result<T, TextError>;
