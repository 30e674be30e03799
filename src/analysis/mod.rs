//! Architecture extraction from paper text.
//!
//! [`ArchitectureExtractor`] applies ordered pattern tables to infer the model
//! family, numeric parameters (layers, hidden size, MLP expansion, attention
//! heads) and the set of structural components a paper mentions.
//!
//! Numeric values outside a plausibility range per parameter are discarded as
//! false positives; among the rest, the last mention in document order wins.

pub mod extractor;
mod patterns;
pub mod types;


pub use extractor::ArchitectureExtractor;
pub use types::{
    ArchParameter, DOWN_PROJ_COMPONENT, ModelArchitecture, ParameterMention,
    SUPER_WEIGHT_COMPONENT,
};
