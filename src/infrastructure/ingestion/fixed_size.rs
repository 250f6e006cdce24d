//! Fixed-size token window chunking

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::ingestion::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

/// Splits text into windows of `chunk_size` words overlapping by `chunk_overlap`.
///
/// Tokens are Unicode words, so chunk boundaries always fall on word
/// boundaries and never split a multi-byte character.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSizeChunker;

impl FixedSizeChunker {
    pub fn new() -> Self {
        Self
    }
}

impl ChunkingStrategy for FixedSizeChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        let tokens: Vec<(usize, &str)> = content.unicode_word_indices().collect();

        if tokens.is_empty() {
            return Ok(vec![]);
        }

        let step = config.step();
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + config.chunk_size).min(tokens.len());
            let byte_start = tokens[start].0;
            let (last_offset, last_word) = tokens[end - 1];
            let byte_end = last_offset + last_word.len();

            chunks.push(Chunk::new(
                &content[byte_start..byte_end],
                ChunkMetadata::new(chunks.len(), byte_start, byte_end, end - start),
            ));

            if end == tokens.len() {
                break;
            }

            start += step;
        }

        let total = chunks.len();
        for chunk in &mut chunks {
            chunk.metadata.total_chunks = total;
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "fixed_size"
    }
}
