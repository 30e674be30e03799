use tracing::{debug, warn};

use super::chunker::{TextChunk, chunk};
use super::error::{TextError, TextResult};
use crate::constants::DEFAULT_CHUNK_CHARS;
use crate::telemetry::Telemetry;

/// Weight given to a caller-supplied query hint.
pub const QUERY_HINT_WEIGHT: u64 = 9;

/// Separator placed between kept chunks.
const CHUNK_SEPARATOR: &str = "\n\n";

/// Keyword → weight table, highest tier first. Matching is case-insensitive
/// substring counting, so every keyword is stored lowercase.
const KEYWORD_WEIGHTS: &[(&str, u64)] = &[
    ("super-weight", 10),
    ("super weight", 10),
    ("superweight", 10),
    ("down projection", 10),
    ("down_proj", 10),
    ("down.proj", 10),
    ("outlier", 8),
    ("architecture", 7),
    ("mlp", 7),
    ("feed-forward", 7),
    ("feedforward", 7),
    ("ffn", 7),
    ("attention", 6),
    ("hidden size", 6),
    ("hidden dimension", 6),
    ("layer", 5),
    ("transformer", 5),
    ("head", 4),
    ("activation", 4),
    ("parameter", 3),
    ("method", 3),
    ("model", 2),
    ("implementation", 2),
    ("results", 1),
    ("experiment", 1),
    ("evaluation", 1),
];

/// A keyword and the weight each occurrence contributes to a chunk score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordWeight {
    pub keyword: String,
    pub weight: u64,
}

/// Reduced document produced by [`RelevanceSelector::select`].
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedText {
    /// Kept chunks joined by a blank line, most relevant first.
    pub text: String,
    /// `num_chunks_kept / total_chunks`.
    pub kept_fraction: f64,
    /// Number of chunks kept (at least one).
    pub num_chunks_kept: usize,
    /// Number of chunks the input was split into.
    pub total_chunks: usize,
}

impl SelectedText {
    fn unchanged(text: &str, total_chunks: usize) -> Self {
        let total_chunks = total_chunks.max(1);
        Self {
            text: text.to_string(),
            kept_fraction: 1.0,
            num_chunks_kept: total_chunks,
            total_chunks,
        }
    }
}

/// Ranks document chunks by weighted keyword density and keeps the top fraction.
#[derive(Debug, Clone)]
pub struct RelevanceSelector {
    max_chars: usize,
    telemetry: Telemetry,
}

impl RelevanceSelector {
    /// Creates a selector that chunks at `max_chars` characters.
    pub fn new(max_chars: usize) -> TextResult<Self> {
        if max_chars == 0 {
            return Err(TextError::ZeroChunkSize { max_chars });
        }
        Ok(Self {
            max_chars,
            telemetry: Telemetry::default(),
        })
    }

    /// Routes this selector's diagnostics through `telemetry`.
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Chunk size in characters.
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Returns the scoring table, with `query_hint` appended when present.
    pub fn keywords(query_hint: Option<&str>) -> Vec<KeywordWeight> {
        let mut keywords: Vec<KeywordWeight> = KEYWORD_WEIGHTS
            .iter()
            .map(|(keyword, weight)| KeywordWeight {
                keyword: (*keyword).to_string(),
                weight: *weight,
            })
            .collect();

        if let Some(hint) = query_hint.map(str::trim).filter(|h| !h.is_empty()) {
            keywords.push(KeywordWeight {
                keyword: hint.to_lowercase(),
                weight: QUERY_HINT_WEIGHT,
            });
        }

        keywords
    }

    /// Scores `content` as `sum(count(keyword) * weight)`.
    ///
    /// Returns `None` if the score overflows.
    pub fn score_chunk(content: &str, keywords: &[KeywordWeight]) -> Option<u64> {
        let lower = content.to_lowercase();
        keywords.iter().try_fold(0u64, |acc, kw| {
            let count = lower.matches(kw.keyword.as_str()).count() as u64;
            acc.checked_add(count.checked_mul(kw.weight)?)
        })
    }

    /// Number of chunks kept out of `total` for `keep_ratio`.
    pub fn kept_count(total: usize, keep_ratio: f64) -> usize {
        ((total as f64 * keep_ratio).floor() as usize).clamp(1, total.max(1))
    }

    /// Keeps the most relevant `keep_ratio` of `text`'s chunks.
    ///
    /// Kept chunks appear in score order (ties keep document order), not in
    /// document order. Inputs with at most one chunk come back unchanged. A
    /// scoring failure also returns the full text rather than an error.
    pub fn select(
        &self,
        text: &str,
        query_hint: Option<&str>,
        keep_ratio: f64,
    ) -> TextResult<SelectedText> {
        if !(0.0..=1.0).contains(&keep_ratio) {
            return Err(TextError::KeepRatioOutOfRange { keep_ratio });
        }

        Ok(self
            .telemetry
            .scope(|| self.select_validated(text, query_hint, keep_ratio)))
    }

    fn select_validated(&self, text: &str, query_hint: Option<&str>, keep_ratio: f64) -> SelectedText {
        let chunks = match chunk(text, self.max_chars) {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(error = %e, "Chunking failed, skipping selection");
                return SelectedText::unchanged(text, 1);
            }
        };

        let total = chunks.len();
        if total <= 1 {
            return SelectedText::unchanged(text, total);
        }

        let keywords = Self::keywords(query_hint);
        let mut scored: Vec<(u64, TextChunk)> = Vec::with_capacity(total);
        for c in chunks {
            match Self::score_chunk(&c.content, &keywords) {
                Some(score) => scored.push((score, c)),
                None => {
                    warn!(
                        offset = c.offset,
                        "Chunk score overflowed, skipping selection"
                    );
                    return SelectedText::unchanged(text, total);
                }
            }
        }

        // Stable: equal scores keep document order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let kept = Self::kept_count(total, keep_ratio);
        let joined = scored[..kept]
            .iter()
            .map(|(_, c)| c.content.as_str())
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR);

        debug!(
            total_chunks = total,
            kept_chunks = kept,
            top_score = scored[0].0,
            "Relevance selection complete"
        );

        SelectedText {
            text: joined,
            kept_fraction: kept as f64 / total as f64,
            num_chunks_kept: kept,
            total_chunks: total,
        }
    }
}

impl Default for RelevanceSelector {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_CHUNK_CHARS,
            telemetry: Telemetry::default(),
        }
    }
}
