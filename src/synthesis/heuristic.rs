use std::collections::HashSet;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::analysis::ArchitectureExtractor;
use crate::constants::{DEFAULT_NUM_LAYERS, matrix_dim_for_family};
use crate::hashing::hash_text;
use crate::prediction::SuperWeightPrediction;
use crate::telemetry::Telemetry;

/// Heuristic predictions never go deeper than this layer bound.
pub const MAX_HEURISTIC_LAYERS: u32 = 12;

/// Draws per prediction before a duplicate coordinate is accepted.
pub const DUPLICATE_RETRIES: usize = 10;

/// Values are drawn uniformly from `[-VALUE_BOUND, VALUE_BOUND]`.
pub const VALUE_BOUND: f64 = 20.0;

/// Architecture-free generator: family from raw text, coordinates drawn
/// uniformly in the early layers, duplicates avoided within one request.
///
/// With a seed, draws derive from `hash(normalized text) ^ seed`, so the same
/// `(text, top_k, seed)` always yields the same output.
#[derive(Debug, Clone)]
pub struct HeuristicGenerator {
    extractor: ArchitectureExtractor,
    num_layers: u32,
    telemetry: Telemetry,
}

impl HeuristicGenerator {
    /// Generator assuming a model `num_layers` deep.
    pub fn new(num_layers: u32) -> Self {
        Self {
            extractor: ArchitectureExtractor::new(),
            num_layers,
            telemetry: Telemetry::default(),
        }
    }

    /// Shares an existing extractor's compiled patterns.
    pub fn with_extractor(mut self, extractor: ArchitectureExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Routes diagnostics through `telemetry`.
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Returns exactly `top_k` predictions for `text`.
    pub fn generate(&self, text: &str, top_k: usize, seed: Option<u64>) -> Vec<SuperWeightPrediction> {
        self.generate_with_layers(text, top_k, seed, self.num_layers)
    }

    /// Like [`generate`](Self::generate) with an explicit model depth.
    pub fn generate_with_layers(
        &self,
        text: &str,
        top_k: usize,
        seed: Option<u64>,
        num_layers: u32,
    ) -> Vec<SuperWeightPrediction> {
        if top_k == 0 {
            return Vec::new();
        }

        self.telemetry.scope(|| {
            let model_family = self.extractor.infer_model_family(text);
            let dim = matrix_dim_for_family(&model_family);
            let layer_bound = num_layers.clamp(1, MAX_HEURISTIC_LAYERS);

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(hash_text(text) ^ seed),
                None => StdRng::from_entropy(),
            };

            let mut used: HashSet<(u32, u32, u32)> = HashSet::with_capacity(top_k);
            let mut predictions = Vec::with_capacity(top_k);

            for _ in 0..top_k {
                let mut coord = (0, 0, 0);
                for _ in 0..DUPLICATE_RETRIES {
                    coord = (
                        rng.gen_range(0..layer_bound),
                        rng.gen_range(0..dim),
                        rng.gen_range(0..dim),
                    );
                    if used.insert(coord) {
                        break;
                    }
                }

                let value = rng.gen_range(-VALUE_BOUND..=VALUE_BOUND);
                let (layer, row, col) = coord;
                predictions.push(SuperWeightPrediction::new(
                    model_family.clone(),
                    layer,
                    row,
                    col,
                    value,
                ));
            }

            debug!(
                model_family = %model_family,
                predictions = predictions.len(),
                unique = used.len(),
                "Heuristic generation complete"
            );

            predictions
        })
    }
}

impl Default for HeuristicGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_LAYERS)
    }
}
