//! paper2sw command-line entrypoint.
//!
//! `paper2sw <paper-path>...` predicts for every paper and writes JSON lines
//! to stdout, or to `PAPER2SW_OUTPUT` (CSV when it ends in `.csv`).

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde_json::json;

use paper2sw::{
    Config, Metadata, PredictionMetrics, Predictor, SuperWeightPrediction, Telemetry,
    read_text_from_source, write_csv, write_jsonl,
};

const USAGE: &str = "usage: paper2sw <paper-path>...";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() || paths.iter().any(|p| p.as_os_str() == "--help") {
        eprintln!("{}", USAGE);
        std::process::exit(if paths.is_empty() { 2 } else { 0 });
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        model_id = %config.model_id,
        backend = %config.backend,
        top_k = config.top_k,
        cache_enabled = config.cache_enabled,
        cache_dir = %config.cache_dir.display(),
        papers = paths.len(),
        "paper2sw starting"
    );

    let predictor =
        Arc::new(Predictor::from_config(&config)?.with_telemetry(Telemetry::from_global()));

    // Unreadable papers get no predictions but keep their slot.
    let documents: Vec<Option<String>> = paths
        .iter()
        .map(|path| match read_text_from_source(path) {
            Ok(document) => Some(document.into_text()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable paper");
                None
            }
        })
        .collect();

    let texts: Vec<String> = documents.iter().flatten().cloned().collect();
    let mut predicted = predictor
        .predict_batch_parallel(texts, config.top_k, config.seed, true)
        .await
        .into_iter();

    let results: Vec<Vec<SuperWeightPrediction>> = documents
        .iter()
        .map(|doc| match doc {
            Some(_) => predicted.next().unwrap_or_default(),
            None => Vec::new(),
        })
        .collect();

    for ((path, predictions), doc) in paths.iter().zip(&results).zip(&documents) {
        if doc.is_none() {
            continue;
        }
        let metrics = PredictionMetrics::evaluate(predictions);
        tracing::info!(
            path = %path.display(),
            predictions = metrics.total_predictions,
            unique_layers = metrics.unique_layers,
            avg_layer = metrics.avg_layer,
            avg_value_abs = metrics.avg_value_abs,
            large_values_ratio = metrics.large_values_ratio,
            "Paper processed"
        );
    }

    match &config.output_path {
        Some(output) => write_file(output, &config, &results)?,
        None => write_stdout(&paths, &results)?,
    }

    let stats = predictor.cache_stats();
    tracing::info!(
        memory_hits = stats.memory_hits,
        disk_hits = stats.disk_hits,
        misses = stats.misses,
        writes = stats.writes,
        "paper2sw finished"
    );

    Ok(())
}

fn write_file(
    output: &Path,
    config: &Config,
    results: &[Vec<SuperWeightPrediction>],
) -> anyhow::Result<()> {
    let predictions: Vec<SuperWeightPrediction> = results.iter().flatten().cloned().collect();

    let mut metadata = Metadata::new();
    metadata.insert("model_id".to_string(), json!(config.model_id));
    metadata.insert("backend".to_string(), json!(config.backend.as_str()));

    let is_csv = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let written = if is_csv {
        write_csv(&predictions, output, Some(&metadata))
    } else {
        write_jsonl(&predictions, output, Some(&metadata))
    };
    written.with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!(path = %output.display(), records = predictions.len(), "Results written");
    Ok(())
}

fn write_stdout(paths: &[PathBuf], results: &[Vec<SuperWeightPrediction>]) -> anyhow::Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());

    for (path, predictions) in paths.iter().zip(results) {
        for prediction in predictions {
            let mut record = serde_json::to_value(prediction)?;
            if let Some(object) = record.as_object_mut() {
                object.insert("source".to_string(), json!(path.display().to_string()));
            }
            writeln!(out, "{}", record)?;
        }
    }

    out.flush()?;
    Ok(())
}
