//! Cross-cutting, shared constants.
//!
//! Defaults used by configuration and by the pipeline stages when no override
//! is supplied. Matrix dimensions live here too so the semantic and heuristic
//! generators agree on the coordinate space for a given model family.

/// Default maximum characters per chunk during relevance selection.
pub const DEFAULT_CHUNK_CHARS: usize = 2000;

/// Default fraction of ranked chunks kept by relevance selection (no selection).
pub const DEFAULT_KEEP_RATIO: f64 = 1.0;

/// Default number of predictions requested.
pub const DEFAULT_TOP_K: usize = 5;

/// Default model identifier used in cache fingerprints.
pub const DEFAULT_MODEL_ID: &str = "paper2sw/paper2sw-diff-semantic";

pub const DEFAULT_DEVICE: &str = "cpu";
pub const DEFAULT_PRECISION: &str = "bf16";

/// Default cache version salt.
pub const DEFAULT_VERSION_SALT: &str = "v1";

/// Default in-memory cache capacity (entries).
pub const DEFAULT_MEMORY_CAPACITY: u64 = 1024;

/// Layer count assumed when a paper never states one.
pub const DEFAULT_NUM_LAYERS: u32 = 32;

/// Square matrix dimension used when the model family is unknown.
pub const DEFAULT_MATRIX_DIM: u32 = 4096;

/// Label used when no model family pattern matches.
pub const UNKNOWN_MODEL_FAMILY: &str = "Unknown-Model";

/// Family label → plausible square weight-matrix dimension.
const FAMILY_DIMENSIONS: &[(&str, u32)] = &[
    ("Llama-7B", 4096),
    ("Mistral-7B", 4096),
    ("Mixtral", 4096),
    ("Olmo-7B", 4096),
    ("Gemma", 3072),
    ("Phi", 2560),
    ("Gpt", 768),
    ("Bert", 768),
    ("T5", 768),
    ("Bart", 1024),
    ("Opt", 4096),
    ("Bloom", 4096),
    ("Falcon", 4544),
    ("Mpt", 4096),
    ("Starcoder", 6144),
];

/// Returns the matrix dimension for a family label, or [`DEFAULT_MATRIX_DIM`].
pub fn matrix_dim_for_family(family: &str) -> u32 {
    FAMILY_DIMENSIONS
        .iter()
        .find(|(label, _)| *label == family)
        .map(|(_, dim)| *dim)
        .unwrap_or(DEFAULT_MATRIX_DIM)
}
