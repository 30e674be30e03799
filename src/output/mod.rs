//! Writing and reading prediction files.
//!
//! JSONL emits one object per prediction; CSV emits a header row followed by
//! one row per prediction. Both accept a metadata map merged into every
//! record, with metadata columns placed after the fixed ones in key order.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::prediction::{PREDICTION_FIELDS, SuperWeightPrediction};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("output file not found: {path}")]
    NotFound { path: PathBuf },
}

pub type OutputResult<T> = Result<T, OutputError>;

/// Extra key/value pairs attached to every emitted record.
pub type Metadata = BTreeMap<String, Value>;

/// Writes `predictions` as JSON lines, creating parent directories.
///
/// Metadata keys never replace the five prediction fields.
pub fn write_jsonl(
    predictions: &[SuperWeightPrediction],
    path: impl AsRef<Path>,
    metadata: Option<&Metadata>,
) -> OutputResult<()> {
    let path = path.as_ref();
    let mut writer = create_writer(path)?;

    for prediction in predictions {
        let line = serde_json::to_string(&record_object(prediction, metadata)?)?;
        writeln!(writer, "{}", line).map_err(|e| io_error(path, e))?;
    }
    writer.flush().map_err(|e| io_error(path, e))?;

    debug!(path = %path.display(), records = predictions.len(), "Wrote JSONL predictions");
    Ok(())
}

/// Writes `predictions` as CSV with a header row, creating parent directories.
pub fn write_csv(
    predictions: &[SuperWeightPrediction],
    path: impl AsRef<Path>,
    metadata: Option<&Metadata>,
) -> OutputResult<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_writer(create_writer(path)?);

    let extra: Vec<(&String, &Value)> = metadata
        .map(|m| {
            m.iter()
                .filter(|(k, _)| !PREDICTION_FIELDS.contains(&k.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let header = PREDICTION_FIELDS
        .iter()
        .copied()
        .chain(extra.iter().map(|(k, _)| k.as_str()));
    writer.write_record(header)?;

    for p in predictions {
        let row: Vec<String> = [
            p.model_family.clone(),
            p.layer.to_string(),
            p.row.to_string(),
            p.col.to_string(),
            p.value.to_string(),
        ]
        .into_iter()
        .chain(extra.iter().map(|(_, v)| csv_value(v)))
        .collect();
        writer.write_record(&row)?;
    }
    writer.flush().map_err(|e| io_error(path, e))?;

    debug!(path = %path.display(), records = predictions.len(), "Wrote CSV predictions");
    Ok(())
}

/// Reads a JSON-lines file into raw objects, skipping blank and malformed lines.
pub fn read_jsonl(path: impl AsRef<Path>) -> OutputResult<Vec<Map<String, Value>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => OutputError::NotFound {
            path: path.to_path_buf(),
        },
        _ => io_error(path, e),
    })?;

    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| io_error(path, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(line) {
            records.push(object);
        }
    }

    Ok(records)
}

fn create_writer(path: &Path) -> OutputResult<BufWriter<File>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    Ok(BufWriter::new(file))
}

fn io_error(path: &Path, source: std::io::Error) -> OutputError {
    OutputError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn record_object(
    prediction: &SuperWeightPrediction,
    metadata: Option<&Metadata>,
) -> OutputResult<Value> {
    let mut value = serde_json::to_value(prediction)?;
    if let (Some(metadata), Value::Object(object)) = (metadata, &mut value) {
        for (k, v) in metadata {
            if !PREDICTION_FIELDS.contains(&k.as_str()) {
                object.insert(k.clone(), v.clone());
            }
        }
    }
    Ok(value)
}

fn csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
