//! End-to-end prediction.
//!
//! [`Predictor`] runs selection, consults the cache, invokes the model on a
//! miss and stores the result:
//!
//! ```text
//! raw text ─▶ RelevanceSelector ─▶ cache get ─(miss)─▶ model ─▶ cache put
//! ```
//!
//! Selection runs before the cache lookup, so the selected text is what gets
//! fingerprinted and a different keep ratio addresses different entries.
//! There is no cross-request locking: two concurrent misses on one key both
//! compute, and the later write wins.

pub mod error;


pub use error::{PredictError, PredictResult};

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{CacheStats, PredictionCache};
use crate::config::Config;
use crate::prediction::SuperWeightPrediction;
use crate::source::read_text_from_source;
use crate::synthesis::{ModelBackend, SuperWeightModel};
use crate::telemetry::Telemetry;
use crate::text::RelevanceSelector;

/// Orchestrates selection, caching and the model for one configuration.
#[derive(Debug)]
pub struct Predictor<M: SuperWeightModel = ModelBackend> {
    model: M,
    model_id: String,
    selector: RelevanceSelector,
    selection_enabled: bool,
    keep_ratio: f64,
    query_hint: Option<String>,
    cache: PredictionCache,
    telemetry: Telemetry,
}

impl Predictor<ModelBackend> {
    /// Builds a predictor with the backend named by `config.backend`.
    ///
    /// # Errors
    ///
    /// - [`PredictError::InvalidArgument`] if `config` fails validation.
    /// - [`PredictError::NotFound`] if the cache directory cannot be created.
    pub fn from_config(config: &Config) -> PredictResult<Self> {
        let model = ModelBackend::from_kind(config.backend, config.fallback_layers);
        Self::with_model(config, model)
    }
}

impl<M: SuperWeightModel> Predictor<M> {
    /// Builds a predictor around an arbitrary model.
    pub fn with_model(config: &Config, model: M) -> PredictResult<Self> {
        config.validate()?;

        let selector = RelevanceSelector::new(config.chunk_chars)?;
        let cache = PredictionCache::open(&config.cache_config())?;

        Ok(Self {
            model,
            model_id: config.model_id.clone(),
            selector,
            selection_enabled: config.selection_enabled(),
            keep_ratio: config.keep_ratio,
            query_hint: config.query_hint.clone(),
            cache,
            telemetry: Telemetry::default(),
        })
    }

    /// Routes diagnostics of every stage through `telemetry`.
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.model.attach_telemetry(telemetry.clone());
        self.selector = self.selector.with_telemetry(telemetry.clone());
        self.cache = self.cache.with_telemetry(telemetry.clone());
        self.telemetry = telemetry;
        self
    }

    /// The backing model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Model identifier used in cache keys.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// The prediction cache, possibly disabled.
    pub fn cache(&self) -> &PredictionCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Predicts super-weight coordinates for `raw_text`.
    ///
    /// Returns at most `top_k` records; `top_k == 0` returns an empty list
    /// without touching the cache. With a seed the result is reproducible.
    /// `use_cache` has no effect when the cache is disabled.
    ///
    /// # Errors
    ///
    /// - [`PredictError::InvalidArgument`] if selection rejects its inputs.
    /// - [`PredictError::ComputationFailure`] if the model fails.
    ///
    /// Cache failures are never surfaced.
    pub fn predict(
        &self,
        raw_text: &str,
        top_k: usize,
        seed: Option<u64>,
        use_cache: bool,
    ) -> PredictResult<Vec<SuperWeightPrediction>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let text = self.selected_text(raw_text)?;
        let use_cache = use_cache && self.cache.is_enabled();

        if use_cache
            && let Some(predictions) = self.cache.get(&self.model_id, &text, top_k, seed)
        {
            self.telemetry.scope(|| {
                debug!(model = self.model.name(), records = predictions.len(), "Served from cache");
            });
            return Ok(predictions);
        }

        let predictions = self.model.predict(&text, top_k, seed)?;

        if use_cache {
            self.cache.put(&self.model_id, &text, top_k, seed, &predictions);
        }

        self.telemetry.scope(|| {
            info!(
                model = self.model.name(),
                top_k,
                seeded = seed.is_some(),
                records = predictions.len(),
                "Prediction complete"
            );
        });

        Ok(predictions)
    }

    /// Reads `path` and predicts on its contents.
    ///
    /// # Errors
    ///
    /// [`PredictError::NotFound`] if the file does not exist, plus everything
    /// [`predict`](Self::predict) returns.
    pub fn predict_source(
        &self,
        path: impl AsRef<Path>,
        top_k: usize,
        seed: Option<u64>,
        use_cache: bool,
    ) -> PredictResult<Vec<SuperWeightPrediction>> {
        let document = read_text_from_source(path)?;
        self.predict(document.text(), top_k, seed, use_cache)
    }

    /// Predicts for each text in order. A failing item yields an empty list
    /// and does not stop the batch.
    pub fn predict_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        top_k: usize,
        seed: Option<u64>,
        use_cache: bool,
    ) -> Vec<Vec<SuperWeightPrediction>> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                self.predict(text.as_ref(), top_k, seed, use_cache)
                    .unwrap_or_else(|e| {
                        self.log_item_failure(index, &e.to_string());
                        Vec::new()
                    })
            })
            .collect()
    }

    fn selected_text<'a>(&self, raw_text: &'a str) -> PredictResult<Cow<'a, str>> {
        if !self.selection_enabled {
            return Ok(Cow::Borrowed(raw_text));
        }

        let selected = self
            .selector
            .select(raw_text, self.query_hint.as_deref(), self.keep_ratio)?;

        self.telemetry.scope(|| {
            debug!(
                kept_chunks = selected.num_chunks_kept,
                total_chunks = selected.total_chunks,
                kept_fraction = selected.kept_fraction,
                "Relevance selection applied"
            );
        });

        Ok(Cow::Owned(selected.text))
    }

    fn log_item_failure(&self, index: usize, error: &str) {
        self.telemetry.scope(|| {
            warn!(index, error, "Batch item failed, returning no predictions");
        });
    }
}

impl<M: SuperWeightModel + 'static> Predictor<M> {
    /// Like [`predict_batch`](Self::predict_batch), with one blocking task per
    /// document. Results keep input order; a failing or panicking item yields
    /// an empty list.
    pub async fn predict_batch_parallel(
        self: &Arc<Self>,
        texts: Vec<String>,
        top_k: usize,
        seed: Option<u64>,
        use_cache: bool,
    ) -> Vec<Vec<SuperWeightPrediction>> {
        let handles: Vec<_> = texts
            .into_iter()
            .map(|text| {
                let predictor = Arc::clone(self);
                tokio::task::spawn_blocking(move || {
                    predictor.predict(&text, top_k, seed, use_cache)
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Ok(predictions)) => results.push(predictions),
                Ok(Err(e)) => {
                    self.log_item_failure(index, &e.to_string());
                    results.push(Vec::new());
                }
                Err(e) => {
                    self.log_item_failure(index, &e.to_string());
                    results.push(Vec::new());
                }
            }
        }

        results
    }
}
