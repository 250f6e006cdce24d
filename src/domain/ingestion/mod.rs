//! Document ingestion domain types
//!
//! Raw documents are split into token windows before embedding.

pub mod chunker;

pub use chunker::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
