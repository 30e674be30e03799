use thiserror::Error;

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::source::SourceError;
use crate::synthesis::SynthesisError;
use crate::text::TextError;

/// Errors surfaced by [`Predictor`](super::Predictor).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PredictError {
    /// Bad ratios, non-positive sizes, or an invalid configuration.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A missing source document, or a cache directory that could not be created.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// Unexpected failure while extracting or synthesizing.
    #[error("computation failed: {reason}")]
    ComputationFailure { reason: String },
}

pub type PredictResult<T> = Result<T, PredictError>;

impl From<TextError> for PredictError {
    fn from(e: TextError) -> Self {
        PredictError::InvalidArgument {
            reason: e.to_string(),
        }
    }
}

impl From<ConfigError> for PredictError {
    fn from(e: ConfigError) -> Self {
        PredictError::InvalidArgument {
            reason: e.to_string(),
        }
    }
}

impl From<SynthesisError> for PredictError {
    fn from(e: SynthesisError) -> Self {
        PredictError::ComputationFailure {
            reason: e.to_string(),
        }
    }
}

impl From<CacheError> for PredictError {
    fn from(e: CacheError) -> Self {
        match e {
            CacheError::DirectoryUnavailable { .. } => PredictError::NotFound {
                what: e.to_string(),
            },
            other => PredictError::ComputationFailure {
                reason: other.to_string(),
            },
        }
    }
}

impl From<SourceError> for PredictError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::NotFound { .. } => PredictError::NotFound {
                what: e.to_string(),
            },
            SourceError::UnsupportedSource { .. } => PredictError::InvalidArgument {
                reason: e.to_string(),
            },
            SourceError::Io { .. } => PredictError::ComputationFailure {
                reason: e.to_string(),
            },
        }
    }
}
