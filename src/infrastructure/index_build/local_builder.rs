//! In-process index builder

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::DomainError;
use crate::domain::corpus::SourceCorpus;
use crate::domain::embedding::{EmbeddingModelLoader, EmbeddingModelSpec, TextEmbedder};
use crate::domain::index_build::{
    BuildSpec, IndexBuilder, ProcessedChunk, ProcessedCorpus, ProcessedSource, ProgressSink,
    StagedIndex,
};
use crate::domain::index_store::{IndexEntry, SourceIndex, VectorIndexStore};
use crate::domain::ingestion::{ChunkingConfig, ChunkingStrategy};
use crate::domain::source::DataSource;

/// Chunks embedded per batch during VECTOR_INDEX_BUILD
pub const EMBEDDING_BATCH_SIZE: usize = 32;

/// Builds indices in-process from the raw corpus
pub struct LocalIndexBuilder {
    corpus: Arc<dyn SourceCorpus>,
    chunker: Arc<dyn ChunkingStrategy>,
    models: Arc<dyn EmbeddingModelLoader>,
    store: Arc<dyn VectorIndexStore>,
}

impl fmt::Debug for LocalIndexBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalIndexBuilder")
            .field("chunker", &self.chunker.name())
            .finish()
    }
}

impl LocalIndexBuilder {
    pub fn new(
        corpus: Arc<dyn SourceCorpus>,
        chunker: Arc<dyn ChunkingStrategy>,
        models: Arc<dyn EmbeddingModelLoader>,
        store: Arc<dyn VectorIndexStore>,
    ) -> Self {
        Self {
            corpus,
            chunker,
            models,
            store,
        }
    }
}

#[async_trait]
impl IndexBuilder for LocalIndexBuilder {
    async fn load_embedding_model(
        &self,
        model: &EmbeddingModelSpec,
    ) -> Result<Arc<dyn TextEmbedder>, DomainError> {
        self.models.load(model).await
    }

    async fn process_documents(
        &self,
        sources: &[DataSource],
        chunking: &ChunkingConfig,
        progress: &dyn ProgressSink,
    ) -> Result<ProcessedCorpus, DomainError> {
        let mut loaded = Vec::with_capacity(sources.len());
        for source in sources {
            loaded.push((source, self.corpus.load(source).await?));
        }

        let total_documents: usize = loaded.iter().map(|(_, docs)| docs.len()).sum();
        if total_documents == 0 {
            return Err(DomainError::validation(
                "No documents found for the selected data sources",
            ));
        }

        let mut processed = 0usize;
        let mut corpus = ProcessedCorpus::default();

        for (source, documents) in loaded {
            let mut chunks = Vec::new();

            for document in documents {
                for chunk in self.chunker.chunk(&document.content, chunking)? {
                    let mut metadata: HashMap<String, Value> = document.metadata.clone();
                    if let Some(ref title) = document.title {
                        metadata.insert("title".to_string(), Value::from(title.clone()));
                    }
                    metadata.insert("document_id".to_string(), Value::from(document.id.clone()));
                    metadata.extend(chunk.metadata.to_json_map());

                    chunks.push(ProcessedChunk {
                        id: format!("{}:{}:{}", source.id(), document.id, chunk.index()),
                        content: chunk.content,
                        metadata,
                    });
                }

                processed += 1;
                progress
                    .report(processed as f64 / total_documents as f64)
                    .await;
            }

            debug!(source_id = %source.id(), chunks = chunks.len(), "Processed source documents");
            corpus.sources.push(ProcessedSource {
                source: source.clone(),
                chunks,
            });
        }

        Ok(corpus)
    }

    async fn build_vector_index(
        &self,
        spec: &BuildSpec,
        corpus: &ProcessedCorpus,
        embedder: &dyn TextEmbedder,
        progress: &dyn ProgressSink,
    ) -> Result<StagedIndex, DomainError> {
        let total = corpus.total_chunks().max(1);
        let mut embedded = 0usize;
        let mut staged = StagedIndex::default();

        for processed in &corpus.sources {
            let mut entries = Vec::with_capacity(processed.chunks.len());

            for batch in processed.chunks.chunks(EMBEDDING_BATCH_SIZE) {
                let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
                let vectors = embedder.embed(&texts).await?;

                if vectors.len() != batch.len() {
                    return Err(DomainError::internal(format!(
                        "Embedder returned {} vectors for {} chunks",
                        vectors.len(),
                        batch.len()
                    )));
                }

                for (chunk, vector) in batch.iter().zip(vectors) {
                    entries.push(IndexEntry {
                        id: chunk.id.clone(),
                        content: chunk.content.clone(),
                        metadata: chunk.metadata.clone(),
                        vector,
                    });
                }

                embedded += batch.len();
                progress.report(embedded as f64 / total as f64).await;
            }

            staged.indices.push(SourceIndex::new(
                processed.source.id().clone(),
                spec.name.clone(),
                spec.backend,
                spec.embedding_model.clone(),
                entries,
            ));
        }

        Ok(staged)
    }

    async fn finalize(&self, staged: StagedIndex) -> Result<(), DomainError> {
        let entries = staged.entry_count();
        let sources = staged.indices.len();

        self.store.publish(staged.indices).await?;

        info!(sources, entries, "Finalized staged indices");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::corpus::RawDocument;
    use crate::domain::index_build::BackendKind;
    use crate::domain::source::repository::tests::create_test_source;
    use crate::domain::source::{SourceId, SourceType};
    use crate::infrastructure::corpus::InMemoryCorpus;
    use crate::infrastructure::embedding::HashingEmbedderLoader;
    use crate::infrastructure::index_store::InMemoryVectorIndexStore;
    use crate::infrastructure::ingestion::FixedSizeChunker;

    #[derive(Default)]
    struct RecordingSink {
        fractions: Mutex<Vec<f64>>,
    }

    #[async_trait]
    impl ProgressSink for RecordingSink {
        async fn report(&self, fraction: f64) {
            self.fractions.lock().unwrap().push(fraction);
        }
    }

    fn spec() -> BuildSpec {
        BuildSpec {
            name: "docs".to_string(),
            source_ids: vec![SourceId::new("docs").unwrap()],
            embedding_model: EmbeddingModelSpec::new("m1", 64),
            backend: BackendKind::Diskann,
            chunking: ChunkingConfig::new(4, 1),
        }
    }

    async fn builder() -> (LocalIndexBuilder, Arc<InMemoryCorpus>, Arc<InMemoryVectorIndexStore>) {
        let corpus = Arc::new(InMemoryCorpus::new());
        let store = Arc::new(InMemoryVectorIndexStore::new());
        let builder = LocalIndexBuilder::new(
            corpus.clone(),
            Arc::new(FixedSizeChunker::new()),
            Arc::new(HashingEmbedderLoader::new()),
            store.clone(),
        );
        (builder, corpus, store)
    }

    #[tokio::test]
    async fn test_full_build() {
        let (builder, corpus, store) = builder().await;
        let source = create_test_source("docs", "Docs", SourceType::Document);
        corpus
            .add_documents(
                source.id(),
                vec![
                    RawDocument::new("a", "the project deadline is next friday afternoon")
                        .with_title("Plan"),
                    RawDocument::new("b", "lunch menu"),
                ],
            )
            .await
            .unwrap();

        let embedder = builder
            .load_embedding_model(&spec().embedding_model)
            .await
            .unwrap();

        let sink = RecordingSink::default();
        let processed = builder
            .process_documents(&[source.clone()], &spec().chunking, &sink)
            .await
            .unwrap();

        assert_eq!(processed.total_chunks(), 3);
        assert_eq!(processed.item_counts()[0].1, 3);
        assert_eq!(*sink.fractions.lock().unwrap(), vec![0.5, 1.0]);

        let first = &processed.sources[0].chunks[0];
        assert_eq!(first.metadata["title"], Value::from("Plan"));
        assert_eq!(first.metadata["document_id"], Value::from("a"));

        let staged = builder
            .build_vector_index(&spec(), &processed, embedder.as_ref(), &sink)
            .await
            .unwrap();
        assert_eq!(staged.entry_count(), 3);
        assert_eq!(store.entry_count().await.unwrap(), 0);

        builder.finalize(staged).await.unwrap();

        let index = store.get(source.id()).await.unwrap().unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.backend, BackendKind::Diskann);
        assert_eq!(index.index_name, "docs");
    }

    #[tokio::test]
    async fn test_no_documents_fails() {
        let (builder, _, _) = builder().await;
        let source = create_test_source("docs", "Docs", SourceType::Document);

        let result = builder
            .process_documents(&[source], &spec().chunking, &RecordingSink::default())
            .await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }
}
