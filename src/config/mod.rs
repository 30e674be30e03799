//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `PAPER2SW_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::{ConfigError, ConfigViolation};

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::CacheConfig;
use crate::constants::{
    DEFAULT_CHUNK_CHARS, DEFAULT_DEVICE, DEFAULT_KEEP_RATIO, DEFAULT_MEMORY_CAPACITY,
    DEFAULT_MODEL_ID, DEFAULT_NUM_LAYERS, DEFAULT_PRECISION, DEFAULT_TOP_K, DEFAULT_VERSION_SALT,
};
use crate::synthesis::BackendKind;

/// Pipeline configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `PAPER2SW_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Model identity mixed into cache keys. Default: `paper2sw/paper2sw-diff-semantic`.
    pub model_id: String,

    /// Default: `cpu`.
    pub device: String,

    /// Default: `bf16`.
    pub precision: String,

    /// Default: [`BackendKind::Semantic`].
    pub backend: BackendKind,

    /// Predictions per document. Default: `5`.
    pub top_k: usize,

    /// `None` means non-deterministic output.
    pub seed: Option<u64>,

    /// Fraction of chunks kept by relevance selection; `1.0` disables it.
    pub keep_ratio: f64,

    /// Extra keyword boosted during selection.
    pub query_hint: Option<String>,

    /// Max characters per chunk. Default: `2000`.
    pub chunk_chars: usize,

    pub cache_enabled: bool,

    /// Default: `~/.cache/paper2sw`, or `./.cache/paper2sw` without a home directory.
    pub cache_dir: PathBuf,

    /// Cache version salt before device/precision are appended. Default: `v1`.
    pub cache_salt: String,

    /// Max entries in the in-memory cache tier. Default: `1024`.
    pub memory_capacity: u64,

    /// Model depth assumed by the heuristic backend. Default: `32`.
    pub fallback_layers: u32,

    /// Where the binary writes results (CSV if it ends in `.csv`); stdout if unset.
    pub output_path: Option<PathBuf>,
}

/// Returns the default on-disk cache location.
pub fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".cache").join("paper2sw"))
        .unwrap_or_else(|| PathBuf::from("./.cache/paper2sw"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            device: DEFAULT_DEVICE.to_string(),
            precision: DEFAULT_PRECISION.to_string(),
            backend: BackendKind::default(),
            top_k: DEFAULT_TOP_K,
            seed: None,
            keep_ratio: DEFAULT_KEEP_RATIO,
            query_hint: None,
            chunk_chars: DEFAULT_CHUNK_CHARS,
            cache_enabled: true,
            cache_dir: default_cache_dir(),
            cache_salt: DEFAULT_VERSION_SALT.to_string(),
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            fallback_layers: DEFAULT_NUM_LAYERS,
            output_path: None,
        }
    }
}

impl Config {
    const ENV_MODEL_ID: &'static str = "PAPER2SW_MODEL_ID";
    const ENV_DEVICE: &'static str = "PAPER2SW_DEVICE";
    const ENV_PRECISION: &'static str = "PAPER2SW_PRECISION";
    const ENV_BACKEND: &'static str = "PAPER2SW_BACKEND";
    const ENV_TOP_K: &'static str = "PAPER2SW_TOP_K";
    const ENV_SEED: &'static str = "PAPER2SW_SEED";
    const ENV_KEEP_RATIO: &'static str = "PAPER2SW_KEEP_RATIO";
    const ENV_QUERY_HINT: &'static str = "PAPER2SW_QUERY_HINT";
    const ENV_CHUNK_CHARS: &'static str = "PAPER2SW_CHUNK_CHARS";
    const ENV_CACHE_ENABLED: &'static str = "PAPER2SW_CACHE_ENABLED";
    const ENV_CACHE_DIR: &'static str = "PAPER2SW_CACHE_DIR";
    const ENV_CACHE_SALT: &'static str = "PAPER2SW_CACHE_SALT";
    const ENV_MEMORY_CAPACITY: &'static str = "PAPER2SW_MEMORY_CAPACITY";
    const ENV_FALLBACK_LAYERS: &'static str = "PAPER2SW_FALLBACK_LAYERS";
    const ENV_OUTPUT: &'static str = "PAPER2SW_OUTPUT";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// Does not validate; call [`Config::validate`] afterwards.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            model_id: Self::parse_string_from_env(Self::ENV_MODEL_ID, defaults.model_id),
            device: Self::parse_string_from_env(Self::ENV_DEVICE, defaults.device),
            precision: Self::parse_string_from_env(Self::ENV_PRECISION, defaults.precision),
            backend: Self::parse_from_env(Self::ENV_BACKEND, defaults.backend)?,
            top_k: Self::parse_from_env(Self::ENV_TOP_K, defaults.top_k)?,
            seed: Self::parse_optional_from_env(Self::ENV_SEED)?,
            keep_ratio: Self::parse_from_env(Self::ENV_KEEP_RATIO, defaults.keep_ratio)?,
            query_hint: Self::parse_optional_string_from_env(Self::ENV_QUERY_HINT),
            chunk_chars: Self::parse_from_env(Self::ENV_CHUNK_CHARS, defaults.chunk_chars)?,
            cache_enabled: Self::parse_bool_from_env(Self::ENV_CACHE_ENABLED, defaults.cache_enabled)?,
            cache_dir: Self::parse_path_from_env(Self::ENV_CACHE_DIR, defaults.cache_dir),
            cache_salt: Self::parse_string_from_env(Self::ENV_CACHE_SALT, defaults.cache_salt),
            memory_capacity: Self::parse_from_env(Self::ENV_MEMORY_CAPACITY, defaults.memory_capacity)?,
            fallback_layers: Self::parse_from_env(Self::ENV_FALLBACK_LAYERS, defaults.fallback_layers)?,
            output_path: Self::parse_optional_string_from_env(Self::ENV_OUTPUT).map(PathBuf::from),
        })
    }

    /// Checks every constraint in one pass.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] listing all violations, in field order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { violations })
        }
    }

    /// Every violated constraint, in field order.
    pub fn violations(&self) -> Vec<ConfigViolation> {
        let mut violations = Vec::new();

        if self.model_id.trim().is_empty() {
            violations.push(ConfigViolation::EmptyModelId);
        }
        if self.device.trim().is_empty() {
            violations.push(ConfigViolation::EmptyDevice);
        }
        if self.precision.trim().is_empty() {
            violations.push(ConfigViolation::EmptyPrecision);
        }
        if !(0.0..=1.0).contains(&self.keep_ratio) {
            violations.push(ConfigViolation::KeepRatioOutOfRange {
                keep_ratio: self.keep_ratio,
            });
        }
        if self.chunk_chars == 0 {
            violations.push(ConfigViolation::ZeroChunkSize);
        }
        if self.memory_capacity == 0 {
            violations.push(ConfigViolation::ZeroMemoryCapacity);
        }
        if self.cache_salt.trim().is_empty() {
            violations.push(ConfigViolation::EmptyVersionSalt);
        }
        if self.fallback_layers == 0 {
            violations.push(ConfigViolation::ZeroFallbackLayers);
        }

        violations
    }

    /// Salt mixed into cache keys: `"{salt}|{device}|{precision}"`.
    pub fn effective_version_salt(&self) -> String {
        format!("{}|{}|{}", self.cache_salt, self.device, self.precision)
    }

    /// Returns `true` when relevance selection should run before prediction.
    #[inline]
    pub fn selection_enabled(&self) -> bool {
        self.keep_ratio < 1.0
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            enabled: self.cache_enabled,
            dir: self.cache_dir.clone(),
            version_salt: self.effective_version_salt(),
            memory_capacity: self.memory_capacity,
        }
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::ParseError {
                    name: var_name,
                    value: value.clone(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_from_env<T>(var_name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::ParseError {
                    name: var_name,
                    value,
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::ParseError {
                    name: var_name,
                    value,
                    reason: "expected a boolean (true/false, 1/0, yes/no, on/off)".to_string(),
                }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        Self::parse_optional_string_from_env(var_name)
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }
}
