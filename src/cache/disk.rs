//! Disk tier: one newline-delimited JSON file per fingerprint.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::error::{CacheError, CacheResult};
use crate::prediction::SuperWeightPrediction;

const JSONL_EXTENSION: &str = "jsonl";

#[derive(Debug, Clone)]
/// Stores and retrieves prediction lists under a cache directory.
pub struct DiskTier {
    dir: PathBuf,
}

impl DiskTier {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensures the cache directory exists.
    pub fn ensure_dir(&self) -> CacheResult<()> {
        if !self.dir.is_dir() {
            fs::create_dir_all(&self.dir).map_err(|_| CacheError::DirectoryUnavailable {
                path: self.dir.clone(),
            })?;
        }
        Ok(())
    }

    /// `<dir>/<fingerprint>.jsonl`
    pub fn entry_path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", fingerprint, JSONL_EXTENSION))
    }

    /// Loads the list stored under `fingerprint`. A missing file is `Ok(None)`;
    /// any undecodable line fails the whole entry.
    pub fn load(&self, fingerprint: &str) -> CacheResult<Option<Vec<SuperWeightPrediction>>> {
        let path = self.entry_path(fingerprint);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut predictions = Vec::new();
        for (i, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let prediction: SuperWeightPrediction =
                serde_json::from_str(line).map_err(|e| CacheError::Corrupt {
                    path: path.clone(),
                    line: i + 1,
                    reason: e.to_string(),
                })?;
            predictions.push(prediction);
        }

        Ok(Some(predictions))
    }

    /// Writes `predictions` under `fingerprint`, replacing any existing file.
    ///
    /// The file is written next to its destination and renamed into place, so
    /// readers see either the old or the new entry.
    pub fn store(
        &self,
        fingerprint: &str,
        predictions: &[SuperWeightPrediction],
    ) -> CacheResult<PathBuf> {
        self.ensure_dir()?;

        let mut buf = String::new();
        for prediction in predictions {
            let line = serde_json::to_string(prediction)
                .map_err(|e| CacheError::Serialization(e.to_string()))?;
            buf.push_str(&line);
            buf.push('\n');
        }

        let final_path = self.entry_path(fingerprint);
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(buf.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&final_path).map_err(|e| CacheError::Io(e.error))?;

        Ok(final_path)
    }

    /// Deletes the entry; returns `false` if there was none.
    pub fn remove(&self, fingerprint: &str) -> CacheResult<bool> {
        match fs::remove_file(self.entry_path(fingerprint)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(&self, fingerprint: &str) -> bool {
        self.entry_path(fingerprint).is_file()
    }

    /// Counts entry files in the cache directory.
    pub fn len(&self) -> CacheResult<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let mut count = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file()
                && let Some(ext) = path.extension()
                && ext == JSONL_EXTENSION
            {
                count += 1;
            }
        }

        Ok(count)
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }
}
