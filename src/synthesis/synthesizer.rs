use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use super::candidates::identify;
use super::heuristic::HeuristicGenerator;
use super::types::{ComponentType, SuperWeightCandidate};
use crate::analysis::{ArchitectureExtractor, ModelArchitecture};
use crate::constants::{DEFAULT_NUM_LAYERS, matrix_dim_for_family};
use crate::prediction::SuperWeightPrediction;
use crate::telemetry::Telemetry;

/// Probability that a down_proj candidate is placed in the middle half of the matrix.
pub const MID_REGION_PROBABILITY: f64 = 0.7;

/// Base values are drawn from `[-VALUE_BOUND, VALUE_BOUND]` before confidence scaling.
pub const VALUE_BOUND: f64 = 15.0;

/// Architecture-driven predictor: extract, identify candidates, then place
/// each candidate in its layer's weight matrix.
#[derive(Debug, Clone)]
pub struct CandidateSynthesizer {
    extractor: ArchitectureExtractor,
    fallback: HeuristicGenerator,
    telemetry: Telemetry,
}

impl CandidateSynthesizer {
    /// Synthesizer with a fresh extractor and heuristic fallback.
    pub fn new() -> Self {
        let extractor = ArchitectureExtractor::new();
        let fallback = HeuristicGenerator::new(DEFAULT_NUM_LAYERS).with_extractor(extractor.clone());
        Self {
            extractor,
            fallback,
            telemetry: Telemetry::default(),
        }
    }

    /// Routes diagnostics of this synthesizer and its extractor through `telemetry`.
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.extractor = self.extractor.with_telemetry(telemetry.clone());
        self.fallback = self.fallback.with_telemetry(telemetry.clone());
        self.telemetry = telemetry;
        self
    }

    /// Phase A. See [`identify`](super::candidates::identify).
    pub fn identify(&self, architecture: &ModelArchitecture) -> Vec<SuperWeightCandidate> {
        identify(architecture)
    }

    /// Phase B: returns at most `top_k` predictions for `text`.
    ///
    /// The first `top_k` candidates (in Phase A order) each get a row/col in
    /// the family's square matrix and a value scaled by `0.5 + confidence`.
    /// With no candidates, defers to the heuristic generator. A seed makes the
    /// output reproducible; without one, draws are non-deterministic.
    pub fn synthesize(&self, text: &str, top_k: usize, seed: Option<u64>) -> Vec<SuperWeightPrediction> {
        if top_k == 0 {
            return Vec::new();
        }

        let architecture = self.extractor.analyze(text);
        let candidates = self.identify(&architecture);

        self.telemetry.scope(|| {
            if candidates.is_empty() {
                warn!(
                    model_family = %architecture.model_family,
                    "No candidates identified, using heuristic generator"
                );
                let num_layers = architecture.num_layers.unwrap_or(DEFAULT_NUM_LAYERS);
                return self.fallback.generate_with_layers(text, top_k, seed, num_layers);
            }

            let dim = matrix_dim_for_family(&architecture.model_family);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let predictions: Vec<SuperWeightPrediction> = candidates
                .iter()
                .take(top_k)
                .map(|c| place(c, &architecture.model_family, dim, &mut rng))
                .collect();

            debug!(
                model_family = %architecture.model_family,
                candidates = candidates.len(),
                predictions = predictions.len(),
                matrix_dim = dim,
                "Candidate synthesis complete"
            );

            predictions
        })
    }
}

impl Default for CandidateSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

fn place(
    candidate: &SuperWeightCandidate,
    model_family: &str,
    dim: u32,
    rng: &mut StdRng,
) -> SuperWeightPrediction {
    let (row, col) = if candidate.component_type == ComponentType::MlpDownProj
        && rng.gen_bool(MID_REGION_PROBABILITY)
    {
        let middle = dim / 4..3 * dim / 4;
        (rng.gen_range(middle.clone()), rng.gen_range(middle))
    } else {
        (rng.gen_range(0..dim), rng.gen_range(0..dim))
    };

    let value = rng.gen_range(-VALUE_BOUND..=VALUE_BOUND) * (0.5 + candidate.confidence);

    SuperWeightPrediction::new(model_family, candidate.layer, row, col, value)
}
