use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use tracing::{debug, info};

use super::patterns::{
    ARCHITECTURE_KEYWORDS, DOWN_PROJ_PATTERN, FAMILY_RULES, LAYER_MENTION_PATTERNS,
    SUPER_WEIGHT_PATTERN, family_label, numeric_patterns,
};
use super::types::{
    ArchParameter, DOWN_PROJ_COMPONENT, ModelArchitecture, ParameterMention,
    SUPER_WEIGHT_COMPONENT,
};
use crate::constants::UNKNOWN_MODEL_FAMILY;
use crate::telemetry::Telemetry;

fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("built-in pattern is valid")
}

struct CompiledPatterns {
    families: Vec<(&'static str, Vec<Regex>)>,
    numeric: Vec<(ArchParameter, Vec<Regex>)>,
    keywords: Vec<(&'static str, Regex)>,
    down_proj: Regex,
    super_weight: Regex,
    layer_mentions: Vec<Regex>,
}

impl CompiledPatterns {
    fn build() -> Self {
        let families: Vec<(&'static str, Vec<Regex>)> = FAMILY_RULES
            .iter()
            .map(|(family, patterns)| (*family, patterns.iter().map(|p| compile(p)).collect()))
            .collect();

        let numeric: Vec<(ArchParameter, Vec<Regex>)> = ArchParameter::ALL
            .iter()
            .map(|param| {
                let compiled: Vec<Regex> = numeric_patterns(*param).iter().map(|p| compile(p)).collect();
                (*param, compiled)
            })
            .collect();

        let keywords: Vec<(&'static str, Regex)> = ARCHITECTURE_KEYWORDS
            .iter()
            .map(|kw| (*kw, compile(&format!(r"\b{}\b", regex::escape(kw)))))
            .collect();

        Self {
            families,
            numeric,
            keywords,
            down_proj: compile(DOWN_PROJ_PATTERN),
            super_weight: compile(SUPER_WEIGHT_PATTERN),
            layer_mentions: LAYER_MENTION_PATTERNS.iter().map(|p| compile(p)).collect(),
        }
    }
}

/// Infers model family and architecture parameters from paper text.
///
/// Cheap to clone; compiled patterns are shared.
#[derive(Clone)]
pub struct ArchitectureExtractor {
    patterns: Arc<CompiledPatterns>,
    telemetry: Telemetry,
}

impl std::fmt::Debug for ArchitectureExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchitectureExtractor")
            .field("families", &self.patterns.families.len())
            .field("keywords", &self.patterns.keywords.len())
            .finish()
    }
}

impl ArchitectureExtractor {
    pub fn new() -> Self {
        Self {
            patterns: Arc::new(CompiledPatterns::build()),
            telemetry: Telemetry::default(),
        }
    }

    /// Routes extraction diagnostics through `telemetry`.
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Extracts a [`ModelArchitecture`] from `text`.
    pub fn analyze(&self, text: &str) -> ModelArchitecture {
        self.telemetry.scope(|| {
            debug!(text_len = text.len(), "Analyzing paper for architectural information");

            let model_family = self.infer_model_family(text);
            let (key_components, mentioned_layers) = self.extract_components(text);

            let mut parameter_constraints = BTreeMap::new();
            if key_components.contains(DOWN_PROJ_COMPONENT) {
                parameter_constraints
                    .insert("down_proj".to_string(), "super-weight candidate".to_string());
            }

            let architecture = ModelArchitecture {
                model_family,
                num_layers: self.final_value(text, ArchParameter::Layers),
                hidden_size: self.final_value(text, ArchParameter::HiddenSize),
                mlp_expansion: self.final_value(text, ArchParameter::MlpExpansion),
                attention_heads: self.final_value(text, ArchParameter::AttentionHeads),
                key_components,
                mentioned_layers,
                parameter_constraints,
            };

            info!(
                model_family = %architecture.model_family,
                num_layers = ?architecture.num_layers,
                components = architecture.key_components.len(),
                "Extracted architecture"
            );

            architecture
        })
    }

    /// Returns the label of the first family rule matching `text`, or
    /// [`UNKNOWN_MODEL_FAMILY`].
    pub fn infer_model_family(&self, text: &str) -> String {
        self.patterns
            .families
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(text)))
            .map(|(family, _)| family_label(family))
            .unwrap_or_else(|| UNKNOWN_MODEL_FAMILY.to_string())
    }

    /// Returns every in-range mention of `param`, in document order.
    ///
    /// Mentions at the same position keep pattern order.
    pub fn parameter_mentions(&self, text: &str, param: ArchParameter) -> Vec<ParameterMention> {
        let range = param.plausible_range();
        let mut mentions: Vec<ParameterMention> = self
            .patterns
            .numeric
            .iter()
            .filter(|(p, _)| *p == param)
            .flat_map(|(_, patterns)| patterns.iter())
            .flat_map(|re| re.captures_iter(text))
            .filter_map(|caps| {
                let digits = caps.get(1)?;
                let value: u32 = digits.as_str().parse().ok()?;
                range.contains(&value).then_some(ParameterMention {
                    position: digits.start(),
                    value,
                })
            })
            .collect();

        mentions.sort_by_key(|m| m.position);
        mentions
    }

    /// The last accepted mention of `param` in document order.
    pub fn final_value(&self, text: &str, param: ArchParameter) -> Option<u32> {
        self.parameter_mentions(text, param).last().map(|m| m.value)
    }

    /// Returns `(key_components, mentioned_layers)`.
    pub fn extract_components(&self, text: &str) -> (BTreeSet<String>, BTreeSet<String>) {
        let mut key_components: BTreeSet<String> = self
            .patterns
            .keywords
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(kw, _)| (*kw).to_string())
            .collect();

        if self.patterns.down_proj.is_match(text) {
            key_components.insert(DOWN_PROJ_COMPONENT.to_string());
        }
        if self.patterns.super_weight.is_match(text) {
            key_components.insert(SUPER_WEIGHT_COMPONENT.to_string());
        }

        let mut mentioned_layers = BTreeSet::new();
        for re in &self.patterns.layer_mentions {
            for caps in re.captures_iter(text) {
                let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
                    continue;
                };
                let mention = m.as_str().trim_end_matches([' ', '-']).trim();
                if !mention.is_empty() {
                    mentioned_layers.insert(mention.to_string());
                }
            }
        }

        (key_components, mentioned_layers)
    }
}

impl Default for ArchitectureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
