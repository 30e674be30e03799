//! Phase A: candidate identification from extracted architecture.

use super::types::{ComponentType, SuperWeightCandidate};
use crate::analysis::ModelArchitecture;
use crate::constants::DEFAULT_NUM_LAYERS;

/// Candidates never go deeper than this many layers.
pub const MAX_CANDIDATE_LAYERS: u32 = 8;

/// Only the first `num_layers / EARLY_LAYER_DIVISOR` layers are considered.
const EARLY_LAYER_DIVISOR: u32 = 4;

const MLP_CONFIDENCE: f64 = 0.6;
const DOWN_PROJ_CONFIDENCE: f64 = 0.8;
const SUPER_WEIGHT_BOOST: f64 = 0.2;
const CONFIDENCE_CAP: f64 = 0.95;
const ADJACENT_SCALE: f64 = 0.7;

const FALLBACK_CONFIDENCE: f64 = 0.4;
const FALLBACK_LAYERS: u32 = 4;

/// Turns architecture facts into an ordered list of layer candidates.
///
/// With MLP, down-projection or super-weight evidence, every early layer gets a
/// `mlp.down_proj` candidate, followed (except for the last early layer) by a
/// weaker candidate for the next layer. Without evidence, the first few layers
/// get low-confidence `unknown` candidates. Order is layer-ascending with each
/// primary before its adjacent.
pub fn identify(architecture: &ModelArchitecture) -> Vec<SuperWeightCandidate> {
    let num_layers = architecture.num_layers.unwrap_or(DEFAULT_NUM_LAYERS);
    let max_layer = MAX_CANDIDATE_LAYERS.min(num_layers / EARLY_LAYER_DIVISOR);

    let has_mlp = architecture.has_mlp_evidence();
    let has_down_proj = architecture.has_down_proj();
    let has_superweight = architecture.has_superweight_mention();

    let mut candidates = Vec::new();

    if has_mlp || has_down_proj || has_superweight {
        let mut confidence = if has_down_proj {
            DOWN_PROJ_CONFIDENCE
        } else {
            MLP_CONFIDENCE
        };
        if has_superweight {
            confidence = CONFIDENCE_CAP.min(confidence + SUPER_WEIGHT_BOOST);
        }

        for layer in 0..max_layer {
            candidates.push(SuperWeightCandidate {
                layer,
                component_type: ComponentType::MlpDownProj,
                confidence,
                evidence: vec![
                    "MLP components mentioned in paper".to_string(),
                    format!("Early layer {} identified as critical", layer),
                ],
            });

            if layer + 1 < max_layer {
                candidates.push(SuperWeightCandidate {
                    layer: layer + 1,
                    component_type: ComponentType::MlpDownProj,
                    confidence: confidence * ADJACENT_SCALE,
                    evidence: vec![
                        format!("Adjacent to critical layer {}", layer),
                        format!("MLP components in layer {}", layer + 1),
                    ],
                });
            }
        }
    }

    if candidates.is_empty() {
        for layer in 0..FALLBACK_LAYERS.min(num_layers) {
            candidates.push(SuperWeightCandidate {
                layer,
                component_type: ComponentType::Unknown,
                confidence: FALLBACK_CONFIDENCE,
                evidence: vec![format!("General heuristic for early layer {}", layer)],
            });
        }
    }

    candidates
}
