//! Stage executors for the index build pipeline

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::BuildSpec;
use crate::domain::DomainError;
use crate::domain::embedding::{EmbeddingModelSpec, TextEmbedder};
use crate::domain::index_store::SourceIndex;
use crate::domain::ingestion::ChunkingConfig;
use crate::domain::source::{DataSource, SourceId};

/// Receives fractional progress (0.0 to 1.0) within a stage
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, fraction: f64);
}

/// A chunk ready for embedding
#[derive(Debug, Clone)]
pub struct ProcessedChunk {
    pub id: String,
    pub content: String,
    pub metadata: HashMap<String, Value>,
}

/// All chunks produced for one source
#[derive(Debug, Clone)]
pub struct ProcessedSource {
    pub source: DataSource,
    pub chunks: Vec<ProcessedChunk>,
}

/// Output of DOCUMENT_PROCESSING
#[derive(Debug, Clone, Default)]
pub struct ProcessedCorpus {
    pub sources: Vec<ProcessedSource>,
}

impl ProcessedCorpus {
    pub fn total_chunks(&self) -> usize {
        self.sources.iter().map(|s| s.chunks.len()).sum()
    }

    /// Chunk count per source
    pub fn item_counts(&self) -> Vec<(SourceId, u64)> {
        self.sources
            .iter()
            .map(|s| (s.source.id().clone(), s.chunks.len() as u64))
            .collect()
    }
}

/// Output of VECTOR_INDEX_BUILD; invisible to searches until finalized
#[derive(Debug, Clone, Default)]
pub struct StagedIndex {
    pub indices: Vec<SourceIndex>,
}

impl StagedIndex {
    pub fn entry_count(&self) -> usize {
        self.indices.iter().map(|i| i.len()).sum()
    }
}

/// Executes the work of each pipeline stage.
///
/// The orchestrator owns stage transitions, progress bookkeeping and
/// source status; a builder only does the work and reports fractions.
#[async_trait]
pub trait IndexBuilder: Send + Sync + Debug {
    /// EMBEDDING_MODEL_LOAD
    async fn load_embedding_model(
        &self,
        model: &EmbeddingModelSpec,
    ) -> Result<Arc<dyn TextEmbedder>, DomainError>;

    /// DOCUMENT_PROCESSING: read raw documents and chunk them
    async fn process_documents(
        &self,
        sources: &[DataSource],
        chunking: &ChunkingConfig,
        progress: &dyn ProgressSink,
    ) -> Result<ProcessedCorpus, DomainError>;

    /// VECTOR_INDEX_BUILD: embed chunks into staged per-source indices
    async fn build_vector_index(
        &self,
        spec: &BuildSpec,
        corpus: &ProcessedCorpus,
        embedder: &dyn TextEmbedder,
        progress: &dyn ProgressSink,
    ) -> Result<StagedIndex, DomainError>;

    /// FINALIZE: publish staged indices to the store
    async fn finalize(&self, staged: StagedIndex) -> Result<(), DomainError>;
}
