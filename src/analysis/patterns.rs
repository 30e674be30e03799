//! Pattern tables for architecture extraction.
//!
//! All patterns are compiled case-insensitively. Order matters: family rules
//! are tried top to bottom and the first match wins.

use super::types::ArchParameter;

/// Family key → patterns. Keys are lowercase; labels are derived in
/// [`family_label`].
pub(crate) const FAMILY_RULES: &[(&str, &[&str])] = &[
    ("llama", &["llama", "llama2", "llama-2", "llama3", "llama-3"]),
    ("mistral", &["mistral"]),
    ("gemma", &["gemma"]),
    ("phi", &["phi[ -]?(1|2|3)"]),
    ("mixtral", &["mixtral"]),
    ("olmo", &["olmo"]),
    ("gpt", &["gpt[ -]?(2|3|4)"]),
    ("bert", &["bert"]),
    ("t5", &["t5"]),
    ("bart", &["bart"]),
    ("opt", &["opt"]),
    ("bloom", &["bloom"]),
    ("falcon", &["falcon"]),
    ("mpt", &["mpt"]),
    ("starcoder", &["starcoder", "star[ -]*coder"]),
];

/// Families whose label carries the `-7B` size suffix.
const SIZED_FAMILIES: &[&str] = &["llama", "mistral", "olmo"];

/// Turns a family key into its display label (`llama` → `Llama-7B`, `phi` → `Phi`).
pub(crate) fn family_label(family: &str) -> String {
    let mut chars = family.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };

    if SIZED_FAMILIES.contains(&family) {
        format!("{}-7B", capitalized)
    } else {
        capitalized
    }
}

/// Ordered patterns per numeric parameter. Each has exactly one capture group.
pub(crate) fn numeric_patterns(param: ArchParameter) -> &'static [&'static str] {
    match param {
        ArchParameter::Layers => &[
            r"(\d+)[ -]*(?:transformer[ -]*)?layers?",
            r"num[ -]*layers?[ =:]?(\d+)",
            r"depth[ =:]?(\d+)",
            r"uses (\d+) transformer layers",
        ],
        ArchParameter::HiddenSize => &[
            r"hidden[ -]*(?:size|dimension)[ =:]?(\d+)",
            r"d[ _]?model[ =:]?(\d+)",
            r"model[ -]*dimension[ =:]?(\d+)",
            r"hidden (?:size|dimension) of (\d+)",
        ],
        ArchParameter::MlpExpansion => &[
            r"mlp[ -]*expansion[ =:]?(\d+)",
            r"feed[ -]*forward[ -]*expansion[ =:]?(\d+)",
            r"ffn[ -]*expansion[ =:]?(\d+)",
            r"expansion[ -]*factor[ =:]?(\d+)",
            r"mlp expansion of (\d+)",
            r"mlp expansion factor is (\d+)",
        ],
        ArchParameter::AttentionHeads => &[
            r"attention[ -]*heads?[ =:]?(\d+)",
            r"num[ -]*heads?[ =:]?(\d+)",
            r"multi[ -]*head[ =:]?(\d+)",
            r"(\d+)[ -]*heads?",
            r"grouped[ -]*query[ -]*attention.*?(\d+)[ -]*heads?",
            r"with (\d+) heads",
            r"use (\d+) attention heads",
        ],
    }
}

/// Architecture vocabulary, matched as whole words. A `.` stands for a
/// literal dot, as in module paths like `q.proj`.
pub(crate) const ARCHITECTURE_KEYWORDS: &[&str] = &[
    "layer",
    "transformer",
    "attention",
    "mlp",
    "feed.forward",
    "feedforward",
    "feed-forward",
    "ffn",
    "multi.head",
    "self.attention",
    "down.proj",
    "up.proj",
    "gate.proj",
    "q.proj",
    "k.proj",
    "v.proj",
    "o.proj",
];

/// Any spelling of the down projection (`down proj`, `down-projection`, `down_proj`).
pub(crate) const DOWN_PROJ_PATTERN: &str = r"down[ _.-]*proj";

/// Explicit super-weight / outlier vocabulary.
pub(crate) const SUPER_WEIGHT_PATTERN: &str =
    r"super[ -]?weights?|outlier (?:parameter|weight|feature|activation)s?";

/// Layer-mention patterns. The first captures the index; the others keep the
/// whole phrase.
pub(crate) const LAYER_MENTION_PATTERNS: &[&str] = &[
    r"(?:layer|block)[ -]*(\d+)",
    r"early[ -]*(?:layer|block)s?[ -]*(?:\d+(?:[ ,-]*\d+)*)?",
    r"first[ -]*\d+[ -]*(?:layer|block)s?",
];
