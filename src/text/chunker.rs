use super::error::{TextError, TextResult};

/// A contiguous slice of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// The slice itself.
    pub content: String,
    /// Character (not byte) offset of the slice within the source text.
    pub offset: usize,
}

impl TextChunk {
    fn new(content: &str, offset: usize) -> Self {
        Self {
            content: content.to_string(),
            offset,
        }
    }

    /// Number of characters in this chunk.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Splits `text` into non-overlapping slices of at most `max_chars` characters.
///
/// Slices preserve document order and concatenate back to `text`. Empty input
/// yields a single empty chunk so every document has at least one.
pub fn chunk(text: &str, max_chars: usize) -> TextResult<Vec<TextChunk>> {
    if max_chars == 0 {
        return Err(TextError::ZeroChunkSize { max_chars });
    }

    if text.is_empty() {
        return Ok(vec![TextChunk::new("", 0)]);
    }

    let mut chunks = Vec::new();
    let mut start_byte = 0;
    let mut start_char = 0;
    let mut count = 0;

    for (byte_idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(TextChunk::new(&text[start_byte..byte_idx], start_char));
            start_byte = byte_idx;
            start_char += count;
            count = 0;
        }
        count += 1;
    }
    chunks.push(TextChunk::new(&text[start_byte..], start_char));

    Ok(chunks)
}
