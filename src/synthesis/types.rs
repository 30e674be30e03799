use std::fmt;

use serde::Serialize;

/// Weight-matrix kind a candidate points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComponentType {
    /// `mlp.down_proj`, where super-weights are usually found.
    MlpDownProj,
    Unknown,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::MlpDownProj => "mlp.down_proj",
            ComponentType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored layer location, before row/col are assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuperWeightCandidate {
    pub layer: u32,
    pub component_type: ComponentType,
    /// In `[0, 1]`.
    pub confidence: f64,
    /// Human-readable reasons, in the order they were established.
    pub evidence: Vec<String>,
}
