use crate::error::TranslationError;
use crate::utils::sentence_divider::{is_sentence_terminator, last_split_point};

/// Request size ceiling of the remote translator, in characters.
pub const MAX_CHUNK: usize = 500;

/// A period closer to the window start than this ratio is not worth a cut.
pub const MIN_SPLIT_RATIO: f64 = 0.7;

/// Byte range `[start, end)` of the original text, on char boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    pub fn slice<'a>(&self, text: &'a str) -> Result<&'a str, TranslationError> {
        text.get(self.start..self.end)
            .ok_or(TranslationError::ChunkOutOfRange {
                start: self.start,
                end: self.end,
                len: text.len(),
            })
    }
}

/// Split `text` into chunks of at most [`MAX_CHUNK`] characters, preferring
/// to cut right after a period once the window is past the split ratio.
pub fn plan_chunks(text: &str) -> Result<Vec<Chunk>, TranslationError> {
    let chars: Vec<char> = text.chars().collect();
    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    let min_split = (MAX_CHUNK as f64 * MIN_SPLIT_RATIO) as usize;
    let len = chars.len();
    let mut chunks = Vec::with_capacity(len / MAX_CHUNK + 1);
    let mut start = 0;

    while start < len {
        let mut end = start.saturating_add(MAX_CHUNK).min(len);

        if end < len && !is_sentence_terminator(chars[end - 1]) {
            if let Some(period) = last_split_point(&chars[start..end]) {
                if period > min_split {
                    end = start + period + 1;
                }
            }
        }

        let (Some(&byte_start), Some(&byte_end)) = (offsets.get(start), offsets.get(end)) else {
            return Err(TranslationError::ChunkOutOfRange {
                start,
                end,
                len: text.len(),
            });
        };
        chunks.push(Chunk {
            start: byte_start,
            end: byte_end,
        });
        start = end;
    }

    Ok(chunks)
}
