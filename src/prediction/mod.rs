//! Emitted prediction records and summary metrics over them.

pub mod metrics;
pub mod record;

pub use metrics::{MetricsComparison, MetricsDelta, PredictionMetrics};
pub use record::{PREDICTION_FIELDS, RecordViolation, SuperWeightPrediction};
