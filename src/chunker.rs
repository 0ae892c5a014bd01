use crate::error::{RagError, Result};
use crate::models::{Chunk, Document};

/// Chunking parameters. Both values count Unicode scalar values, not bytes.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Target maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks of one document.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Splits document text into overlapping chunks of at most `chunk_size`
/// characters.
///
/// Each window is cut at the furthest break point available, preferring a
/// paragraph break, then a sentence end, then a word boundary, then a hard
/// character cut. The next window starts exactly `chunk_overlap` characters
/// before the previous cut, so consecutive chunks share that much context
/// across the boundary.
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Fails fast when `chunk_overlap >= chunk_size`: the window could not
    /// advance.
    pub fn new(config: &ChunkingConfig) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(RagError::Configuration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(RagError::Configuration(format!(
                "chunk_overlap ({}) must be strictly less than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        })
    }

    /// Chunk every document, preserving the back-reference to its filename.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for document in documents {
            let pieces = self.split_text(&document.content);
            log::info!("Split {} into {} chunks", document.filename, pieces.len());
            for (index, text) in pieces.into_iter().enumerate() {
                chunks.push(Chunk {
                    index,
                    text,
                    source: document.filename.clone(),
                });
            }
        }
        chunks
    }

    /// Split one text into overlapping pieces. A text no longer than
    /// `chunk_size` yields exactly one piece.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        if total == 0 {
            return Vec::new();
        }

        let mut pieces = Vec::new();
        let mut start = 0usize;
        loop {
            let window_end = (start + self.chunk_size).min(total);
            let end = if window_end == total {
                total
            } else {
                self.break_point(&chars, start, window_end)
            };

            pieces.push(chars[start..end].iter().collect());
            if end == total {
                break;
            }

            let next = end.saturating_sub(self.chunk_overlap);
            // The cut can land close to `start` on separator-poor text;
            // always advance by at least one character.
            start = next.max(start + 1);
        }
        pieces
    }

    /// Furthest cut position in `[start, window_end)`, by separator
    /// preference: paragraph, sentence, word, then the window edge.
    fn break_point(&self, chars: &[char], start: usize, window_end: usize) -> usize {
        // Paragraph break: cut after the blank line.
        for i in (start..window_end.saturating_sub(1)).rev() {
            if chars[i] == '\n' && chars[i + 1] == '\n' {
                return i + 2;
            }
        }

        // Sentence end: punctuation followed by whitespace.
        for i in (start..window_end.saturating_sub(1)).rev() {
            if matches!(chars[i], '.' | '!' | '?') && chars[i + 1].is_whitespace() {
                return i + 2;
            }
        }

        // Word boundary.
        for i in (start..window_end).rev() {
            if chars[i].is_whitespace() {
                return i + 1;
            }
        }

        window_end
    }
}
