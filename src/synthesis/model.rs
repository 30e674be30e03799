use std::fmt;
use std::str::FromStr;

use super::error::{SynthesisError, SynthesisResult};
use super::heuristic::HeuristicGenerator;
use super::synthesizer::CandidateSynthesizer;
use crate::prediction::SuperWeightPrediction;
use crate::telemetry::Telemetry;

/// A strategy that turns (already selected) paper text into predictions.
///
/// Implementations must return at most `top_k` records and must be
/// reproducible for a fixed `seed`.
pub trait SuperWeightModel: Send + Sync {
    fn predict(
        &self,
        text: &str,
        top_k: usize,
        seed: Option<u64>,
    ) -> SynthesisResult<Vec<SuperWeightPrediction>>;

    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Routes the model's own diagnostics through `telemetry`.
    fn attach_telemetry(&mut self, _telemetry: Telemetry) {}
}

/// Which built-in model backs a predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Architecture extraction plus candidate synthesis.
    #[default]
    Semantic,
    /// Family inference plus uniform coordinate draws.
    Heuristic,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Semantic => "semantic",
            BackendKind::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "semantic" => Ok(BackendKind::Semantic),
            "heuristic" => Ok(BackendKind::Heuristic),
            other => Err(format!(
                "unknown backend '{}' (expected 'semantic' or 'heuristic')",
                other
            )),
        }
    }
}

/// The built-in models.
#[derive(Debug, Clone)]
pub enum ModelBackend {
    Semantic(CandidateSynthesizer),
    Heuristic(HeuristicGenerator),
}

impl ModelBackend {
    /// `num_layers` is the depth assumed by the heuristic backend.
    pub fn from_kind(kind: BackendKind, num_layers: u32) -> Self {
        match kind {
            BackendKind::Semantic => ModelBackend::Semantic(CandidateSynthesizer::new()),
            BackendKind::Heuristic => ModelBackend::Heuristic(HeuristicGenerator::new(num_layers)),
        }
    }

    pub fn with_telemetry(self, telemetry: Telemetry) -> Self {
        match self {
            ModelBackend::Semantic(s) => ModelBackend::Semantic(s.with_telemetry(telemetry)),
            ModelBackend::Heuristic(h) => ModelBackend::Heuristic(h.with_telemetry(telemetry)),
        }
    }

    /// Which backend this is.
    pub fn kind(&self) -> BackendKind {
        match self {
            ModelBackend::Semantic(_) => BackendKind::Semantic,
            ModelBackend::Heuristic(_) => BackendKind::Heuristic,
        }
    }
}

impl Default for ModelBackend {
    fn default() -> Self {
        ModelBackend::Semantic(CandidateSynthesizer::new())
    }
}

impl SuperWeightModel for ModelBackend {
    fn predict(
        &self,
        text: &str,
        top_k: usize,
        seed: Option<u64>,
    ) -> SynthesisResult<Vec<SuperWeightPrediction>> {
        let predictions = match self {
            ModelBackend::Semantic(s) => s.synthesize(text, top_k, seed),
            ModelBackend::Heuristic(h) => h.generate(text, top_k, seed),
        };
        check_records(&predictions)?;
        Ok(predictions)
    }

    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn attach_telemetry(&mut self, telemetry: Telemetry) {
        *self = std::mem::take(self).with_telemetry(telemetry);
    }
}

/// Rejects the first record that fails validation.
pub(crate) fn check_records(predictions: &[SuperWeightPrediction]) -> SynthesisResult<()> {
    for (index, prediction) in predictions.iter().enumerate() {
        if let Err(violations) = prediction.validate() {
            let reason = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(SynthesisError::InvalidRecord { index, reason });
        }
    }
    Ok(())
}

/// Deterministic model for tests: counts calls and fails on a marker.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default, Clone)]
pub struct MockModel {
    calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    fail_marker: Option<String>,
}

#[cfg(any(test, feature = "mock"))]
impl MockModel {
    pub const FAMILY: &'static str = "Mock-Model";

    pub fn new() -> Self {
        Self::default()
    }

    /// Any text containing `marker` makes `predict` fail.
    pub fn failing_on(marker: impl Into<String>) -> Self {
        Self {
            fail_marker: Some(marker.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "mock"))]
impl SuperWeightModel for MockModel {
    fn predict(
        &self,
        text: &str,
        top_k: usize,
        seed: Option<u64>,
    ) -> SynthesisResult<Vec<SuperWeightPrediction>> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if let Some(marker) = &self.fail_marker
            && text.contains(marker.as_str())
        {
            return Err(SynthesisError::ComputationFailed {
                reason: format!("mock failure on '{}'", marker),
            });
        }

        let base = crate::hashing::hash_text(text) ^ seed.unwrap_or(0);
        Ok((0..top_k)
            .map(|i| {
                let i = i as u32;
                SuperWeightPrediction::new(
                    Self::FAMILY,
                    i,
                    (base % 4096) as u32,
                    ((base >> 16) % 4096) as u32,
                    f64::from(i) + 0.5,
                )
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
