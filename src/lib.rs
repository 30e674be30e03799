//! paper2sw library crate (used by the binary and integration tests).
//!
//! Predicts "super-weight" coordinates `(layer, row, col)` and values for a
//! language model from the text of a paper describing it.
//!
//! # Pipeline
//!
//! 1. [`text`]: chunk the paper and keep the most architecture-relevant
//!    fraction ([`RelevanceSelector`]).
//! 2. [`analysis`]: extract the model family, numeric parameters and
//!    mentioned components ([`ArchitectureExtractor`]).
//! 3. [`synthesis`]: turn that into ranked layer candidates and place each in
//!    its weight matrix ([`CandidateSynthesizer`]), or draw coordinates
//!    heuristically ([`HeuristicGenerator`]).
//! 4. [`cache`]: memoize results by content fingerprint ([`PredictionCache`]).
//!
//! [`Predictor`] ties the stages together; [`Config`] configures it from
//! `PAPER2SW_*` environment variables.
//!
//! ## Test/Mock Support
//! [`MockModel`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod constants;
pub mod hashing;
pub mod output;
pub mod prediction;
pub mod predictor;
pub mod source;
pub mod synthesis;
pub mod telemetry;
pub mod text;

pub use analysis::{ArchParameter, ArchitectureExtractor, ModelArchitecture};
pub use cache::{CacheConfig, CacheError, CacheLookup, CacheStats, CacheStatus, PredictionCache};
pub use config::{Config, ConfigError, ConfigViolation};
pub use constants::{UNKNOWN_MODEL_FAMILY, matrix_dim_for_family};
pub use hashing::{fingerprint, normalize_whitespace};
pub use output::{Metadata, OutputError, read_jsonl, write_csv, write_jsonl};
pub use prediction::{MetricsComparison, PredictionMetrics, SuperWeightPrediction};
pub use predictor::{PredictError, PredictResult, Predictor};
pub use source::{RawDocument, SourceError, read_text_from_source};
#[cfg(any(test, feature = "mock"))]
pub use synthesis::MockModel;
pub use synthesis::{
    BackendKind, CandidateSynthesizer, ComponentType, HeuristicGenerator, ModelBackend,
    SuperWeightCandidate, SuperWeightModel, SynthesisError,
};
pub use telemetry::Telemetry;
pub use text::{RelevanceSelector, SelectedText, TextChunk, TextError, chunk};
