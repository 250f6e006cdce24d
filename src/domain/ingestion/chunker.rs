//! Chunking strategy trait and types

use std::collections::HashMap;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

/// Configuration for chunking, measured in tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in tokens
    pub chunk_size: usize,
    /// Tokens shared by consecutive chunks
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be greater than 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::validation(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        Ok(())
    }

    /// Tokens to advance between chunk starts
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.chunk_overlap).max(1)
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 50,
        }
    }
}

/// Position of a chunk within its document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub chunk_index: usize,
    pub total_chunks: usize,
    /// Byte offset of the first token
    pub byte_start: usize,
    /// Byte offset one past the last token
    pub byte_end: usize,
    pub token_count: usize,
}

impl ChunkMetadata {
    pub fn new(chunk_index: usize, byte_start: usize, byte_end: usize, token_count: usize) -> Self {
        Self {
            chunk_index,
            total_chunks: 0,
            byte_start,
            byte_end,
            token_count,
        }
    }

    /// Convert to JSON value map
    pub fn to_json_map(&self) -> HashMap<String, Value> {
        HashMap::from([
            ("chunk_index".to_string(), Value::from(self.chunk_index)),
            ("total_chunks".to_string(), Value::from(self.total_chunks)),
            ("byte_start".to_string(), Value::from(self.byte_start)),
            ("byte_end".to_string(), Value::from(self.byte_end)),
        ])
    }
}

/// A chunk of text extracted from a document
#[derive(Debug, Clone)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    pub fn index(&self) -> usize {
        self.metadata.chunk_index
    }
}

/// Trait for chunking strategies
pub trait ChunkingStrategy: Send + Sync + Debug {
    /// Split content into chunks
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError>;

    /// Get the strategy name
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ChunkingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.step(), 462);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        assert!(ChunkingConfig::new(512, 50).validate().is_ok());
        assert!(ChunkingConfig::new(512, 600).validate().is_err());
        assert!(ChunkingConfig::new(512, 512).validate().is_err());
        assert!(ChunkingConfig::new(0, 0).validate().is_err());
    }

    #[test]
    fn test_metadata_json_map() {
        let mut metadata = ChunkMetadata::new(2, 10, 42, 7);
        metadata.total_chunks = 5;

        let map = metadata.to_json_map();
        assert_eq!(map["chunk_index"], Value::from(2));
        assert_eq!(map["total_chunks"], Value::from(5));
        assert_eq!(map["byte_end"], Value::from(42));
    }
}
