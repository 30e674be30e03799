//! Configuration error types.

use std::fmt;
use thiserror::Error;

/// A single violated configuration constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigViolation {
    EmptyModelId,
    EmptyDevice,
    EmptyPrecision,
    /// Keep ratio must lie in `[0, 1]`.
    KeepRatioOutOfRange { keep_ratio: f64 },
    ZeroChunkSize,
    ZeroMemoryCapacity,
    EmptyVersionSalt,
    ZeroFallbackLayers,
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyModelId => write!(f, "model id must not be empty"),
            Self::EmptyDevice => write!(f, "device must not be empty"),
            Self::EmptyPrecision => write!(f, "precision must not be empty"),
            Self::KeepRatioOutOfRange { keep_ratio } => {
                write!(f, "keep ratio {} must be in [0, 1]", keep_ratio)
            }
            Self::ZeroChunkSize => write!(f, "chunk size must be positive"),
            Self::ZeroMemoryCapacity => write!(f, "memory cache capacity must be positive"),
            Self::EmptyVersionSalt => write!(f, "cache version salt must not be empty"),
            Self::ZeroFallbackLayers => write!(f, "fallback layer count must be positive"),
        }
    }
}

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// An environment variable held a value of the wrong shape.
    #[error("failed to parse {name}='{value}': {reason}")]
    ParseError {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// One or more constraints were violated; all of them are listed.
    #[error("invalid configuration: {}", format_violations(.violations))]
    Invalid { violations: Vec<ConfigViolation> },
}

fn format_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
