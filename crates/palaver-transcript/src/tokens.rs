//! Transcript token accounting.
//!
//! Content is split into fixed-width character chunks and each chunk is
//! tokenized independently; the per-chunk counts are summed. This
//! undercounts relative to tokenizing the whole string whenever a token
//! would span a chunk boundary. The approximation is a compatibility
//! requirement (stored totals must keep matching historical transcripts)
//! so do not "fix" it by tokenizing whole strings.

use tiktoken_rs::CoreBPE;

use palaver_core::config::TOKEN_CHUNK_CHARS;
use palaver_core::Turn;

use crate::error::{Result, TranscriptError};

/// GPT-2-vocabulary token counter.
///
/// Building the BPE is expensive; construct once and share.
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::r50k_base().map_err(|e| TranscriptError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }

    /// Count tokens in one text, chunked at `TOKEN_CHUNK_CHARS` characters.
    pub fn count(&self, text: &str) -> u64 {
        char_chunks(text, TOKEN_CHUNK_CHARS)
            .into_iter()
            .map(|chunk| self.bpe.encode_ordinary(&chunk).len() as u64)
            .sum()
    }

    /// Total token count over every turn's content.
    pub fn count_conversation(&self, turns: &[Turn]) -> u64 {
        turns.iter().map(|t| self.count(&t.content)).sum()
    }
}

/// Split into consecutive runs of at most `width` characters (not bytes;
/// multi-byte content must not be split mid-character).
fn char_chunks(text: &str, width: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for (i, ch) in text.chars().enumerate() {
        if i > 0 && i % width == 0 {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_chunks_respects_width() {
        let text = "a".repeat(2500);
        let chunks = char_chunks(&text, 1024);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 1024);
        assert_eq!(chunks[2].chars().count(), 452);
    }

    #[test]
    fn char_chunks_empty_text() {
        assert!(char_chunks("", 1024).is_empty());
    }

    #[test]
    fn count_sums_per_chunk() {
        let counter = TokenCounter::new().expect("bpe");
        // A short text fits in one chunk, so the chunked count equals the
        // whole-string count.
        let text = "hello world, this is a transcript";
        let whole = counter.bpe.encode_ordinary(text).len() as u64;
        assert_eq!(counter.count(text), whole);
    }

    #[test]
    fn count_is_chunked_not_whole_string() {
        let counter = TokenCounter::new().expect("bpe");
        let text = "a".repeat(3000);
        let per_chunk: u64 = char_chunks(&text, 1024)
            .into_iter()
            .map(|c| counter.bpe.encode_ordinary(&c).len() as u64)
            .sum();
        assert_eq!(counter.count(&text), per_chunk);
    }
}
