use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("synthesis computation failed: {reason}")]
    ComputationFailed { reason: String },

    #[error("synthesized prediction {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

pub type SynthesisResult<T> = Result<T, SynthesisError>;
