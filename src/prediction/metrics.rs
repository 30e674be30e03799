//! Summary statistics over a prediction set.

use std::collections::HashSet;

use serde::Serialize;

use super::record::SuperWeightPrediction;

/// Magnitude above which a value counts as "large" (typical of super-weights).
pub const LARGE_VALUE_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PredictionMetrics {
    pub total_predictions: usize,
    pub unique_layers: usize,
    pub avg_layer: f64,
    pub max_value: f64,
    pub min_value: f64,
    pub avg_value_abs: f64,
    /// Fraction of predictions with `|value| > 10`.
    pub large_values_ratio: f64,
}

impl PredictionMetrics {
    /// Computes metrics; an empty slice yields all zeros.
    pub fn evaluate(predictions: &[SuperWeightPrediction]) -> Self {
        if predictions.is_empty() {
            return Self::default();
        }

        let n = predictions.len() as f64;
        let unique_layers = predictions
            .iter()
            .map(|p| p.layer)
            .collect::<HashSet<_>>()
            .len();
        let avg_layer = predictions.iter().map(|p| f64::from(p.layer)).sum::<f64>() / n;
        let max_value = predictions
            .iter()
            .map(|p| p.value)
            .fold(f64::NEG_INFINITY, f64::max);
        let min_value = predictions
            .iter()
            .map(|p| p.value)
            .fold(f64::INFINITY, f64::min);
        let avg_value_abs = predictions.iter().map(|p| p.value.abs()).sum::<f64>() / n;
        let large = predictions
            .iter()
            .filter(|p| p.value.abs() > LARGE_VALUE_THRESHOLD)
            .count();

        Self {
            total_predictions: predictions.len(),
            unique_layers,
            avg_layer,
            max_value,
            min_value,
            avg_value_abs,
            large_values_ratio: large as f64 / n,
        }
    }
}

/// Differences `second - first` between two metric sets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsDelta {
    pub total_predictions_diff: i64,
    pub avg_layer_diff: f64,
    pub avg_value_abs_diff: f64,
    pub large_values_ratio_diff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsComparison {
    pub first: PredictionMetrics,
    pub second: PredictionMetrics,
    /// Present only when both sets are non-empty.
    pub differences: Option<MetricsDelta>,
}

impl MetricsComparison {
    pub fn compare(first: &[SuperWeightPrediction], second: &[SuperWeightPrediction]) -> Self {
        let a = PredictionMetrics::evaluate(first);
        let b = PredictionMetrics::evaluate(second);

        let differences = (a.total_predictions > 0 && b.total_predictions > 0).then(|| MetricsDelta {
            total_predictions_diff: b.total_predictions as i64 - a.total_predictions as i64,
            avg_layer_diff: b.avg_layer - a.avg_layer,
            avg_value_abs_diff: b.avg_value_abs - a.avg_value_abs,
            large_values_ratio_diff: b.large_values_ratio - a.large_values_ratio,
        });

        Self {
            first: a,
            second: b,
            differences,
        }
    }
}
