//! Obtaining paper text.
//!
//! Only local files are read. Bytes are decoded as UTF-8 with invalid
//! sequences dropped, so every document yields some text.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Schemes that would need a network fetch.
const REMOTE_SCHEMES: &[&str] = &["http://", "https://", "ftp://", "s3://"];

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source not found: {path}")]
    NotFound { path: PathBuf },

    #[error("unsupported source '{source_name}': only local files can be read")]
    UnsupportedSource { source_name: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Paper text decoded from raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    text: String,
}

impl RawDocument {
    /// Decodes `bytes` as UTF-8, dropping invalid sequences.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut text = String::with_capacity(bytes.len());
        for chunk in bytes.utf8_chunks() {
            text.push_str(chunk.valid());
        }
        Self { text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the document, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }
}

impl From<String> for RawDocument {
    fn from(text: String) -> Self {
        Self { text }
    }
}

/// Reads the document at `path`.
///
/// # Errors
///
/// - [`SourceError::UnsupportedSource`] for URLs.
/// - [`SourceError::NotFound`] if no file exists at `path`.
/// - [`SourceError::Io`] for any other read failure.
pub fn read_text_from_source(path: impl AsRef<Path>) -> SourceResult<RawDocument> {
    let path = path.as_ref();
    let display = path.to_string_lossy();
    let lowered = display.to_ascii_lowercase();

    if REMOTE_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return Err(SourceError::UnsupportedSource {
            source_name: display.into_owned(),
        });
    }

    match fs::read(path) {
        Ok(bytes) => Ok(RawDocument::from_bytes(&bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(SourceError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(SourceError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
