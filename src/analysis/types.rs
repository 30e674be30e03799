use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

/// Canonical component token for every spelling of the MLP down projection.
pub const DOWN_PROJ_COMPONENT: &str = "down.proj";

/// Canonical component token for explicit super-weight / outlier vocabulary.
pub const SUPER_WEIGHT_COMPONENT: &str = "super-weight";

/// Structural facts extracted from a paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelArchitecture {
    pub model_family: String,
    pub num_layers: Option<u32>,
    pub hidden_size: Option<u32>,
    pub mlp_expansion: Option<u32>,
    pub attention_heads: Option<u32>,
    /// Matched architecture vocabulary (plus canonical tokens).
    pub key_components: BTreeSet<String>,
    /// Layer indices and "early/first N layers" phrases.
    pub mentioned_layers: BTreeSet<String>,
    pub parameter_constraints: BTreeMap<String, String>,
}

impl ModelArchitecture {
    /// Returns `true` if any MLP / feed-forward component was mentioned.
    pub fn has_mlp_evidence(&self) -> bool {
        self.key_components.iter().any(|c| {
            let c = c.to_lowercase();
            c.contains("mlp") || c.contains("feed") || c.contains("ffn")
        })
    }

    /// Returns `true` if the down projection was mentioned in any spelling.
    pub fn has_down_proj(&self) -> bool {
        self.key_components.iter().any(|c| c.contains("down"))
    }

    /// Returns `true` if the paper uses super-weight or outlier vocabulary.
    pub fn has_superweight_mention(&self) -> bool {
        self.key_components
            .iter()
            .any(|c| c.contains("super") || c.contains("outlier"))
    }
}

/// Numeric architecture parameters recognised by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArchParameter {
    Layers,
    HiddenSize,
    MlpExpansion,
    AttentionHeads,
}

impl ArchParameter {
    pub const ALL: [ArchParameter; 4] = [
        ArchParameter::Layers,
        ArchParameter::HiddenSize,
        ArchParameter::MlpExpansion,
        ArchParameter::AttentionHeads,
    ];

    /// Values outside this range are treated as false positives.
    pub fn plausible_range(&self) -> RangeInclusive<u32> {
        match self {
            ArchParameter::Layers => 5..=100,
            ArchParameter::HiddenSize => 64..=16384,
            ArchParameter::MlpExpansion => 2..=16,
            ArchParameter::AttentionHeads => 1..=128,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArchParameter::Layers => "layers",
            ArchParameter::HiddenSize => "hidden_size",
            ArchParameter::MlpExpansion => "mlp_expansion",
            ArchParameter::AttentionHeads => "attention_heads",
        }
    }
}

impl fmt::Display for ArchParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted numeric mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterMention {
    /// Byte offset of the match in the analysed text.
    pub position: usize,
    pub value: u32,
}
