//! Prediction synthesis.
//!
//! Two strategies implement [`SuperWeightModel`]:
//!
//! - [`CandidateSynthesizer`]: extracts the architecture, identifies layer
//!   candidates (Phase A, [`identify`]) and places each one in the family's
//!   weight matrix (Phase B).
//! - [`HeuristicGenerator`]: infers only the family and draws coordinates
//!   uniformly from the early layers.
//!
//! [`ModelBackend`] selects between them from a [`BackendKind`].

pub mod candidates;
pub mod error;
pub mod heuristic;
pub mod model;
pub mod synthesizer;
pub mod types;


pub use candidates::{MAX_CANDIDATE_LAYERS, identify};
pub use error::{SynthesisError, SynthesisResult};
pub use heuristic::{HeuristicGenerator, MAX_HEURISTIC_LAYERS};
#[cfg(any(test, feature = "mock"))]
pub use model::MockModel;
pub use model::{BackendKind, ModelBackend, SuperWeightModel};
pub use synthesizer::CandidateSynthesizer;
pub use types::{ComponentType, SuperWeightCandidate};
