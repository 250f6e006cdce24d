//! Adapter core shared by every source type backed by the vector index store

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainError;
use crate::domain::embedding::{EmbeddingModelLoader, cosine_similarity};
use crate::domain::index_store::{ScoredEntry, VectorIndexStore};
use crate::domain::search::{AdapterDescription, SearchHit, SearchQuery, SourceAdapter, clamp_score};
use crate::domain::source::{DataSource, SourceType};

/// Per-type metadata conventions
pub trait MetadataProfile: Send + Sync + 'static {
    const SOURCE_TYPE: SourceType;

    /// Normalize stored chunk metadata into the keys clients expect
    /// (`title`, `author`, `path`, `contact`, `url`, `language`, `date`)
    fn shape(metadata: &mut HashMap<String, Value>);
}

/// Move the first present key among `aliases` to `target` unless set
pub(crate) fn promote(metadata: &mut HashMap<String, Value>, target: &str, aliases: &[&str]) {
    if metadata.get(target).is_some_and(|v| !v.is_null()) {
        return;
    }

    for alias in aliases {
        if let Some(value) = metadata.get(*alias).filter(|v| !v.is_null()).cloned() {
            metadata.insert(target.to_string(), value);
            return;
        }
    }
}

/// Searches the index a build job published for a source
pub struct IndexedAdapter<P: MetadataProfile> {
    store: Arc<dyn VectorIndexStore>,
    models: Arc<dyn EmbeddingModelLoader>,
    _profile: PhantomData<P>,
}

impl<P: MetadataProfile> fmt::Debug for IndexedAdapter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedAdapter")
            .field("source_type", &P::SOURCE_TYPE)
            .finish()
    }
}

impl<P: MetadataProfile> IndexedAdapter<P> {
    pub fn new(store: Arc<dyn VectorIndexStore>, models: Arc<dyn EmbeddingModelLoader>) -> Self {
        Self {
            store,
            models,
            _profile: PhantomData,
        }
    }
}

#[async_trait]
impl<P: MetadataProfile> SourceAdapter for IndexedAdapter<P> {
    fn source_type(&self) -> SourceType {
        P::SOURCE_TYPE
    }

    async fn search(
        &self,
        source: &DataSource,
        query: &SearchQuery,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let index = self.store.get(source.id()).await?.ok_or_else(|| {
            DomainError::adapter(source.id().as_str(), "no index has been published")
        })?;

        let embedder = self.models.load(&index.embedding_model).await?;
        let query_vector = embedder.embed_one(&query.text).await?;

        let mut candidates: Vec<ScoredEntry<'_>> =
            index.search(&query_vector, query.top_k, query.complexity);

        if query.recompute_embeddings && !candidates.is_empty() {
            let texts: Vec<String> = candidates.iter().map(|c| c.entry.content.clone()).collect();
            let vectors = embedder.embed(&texts).await?;

            for (candidate, vector) in candidates.iter_mut().zip(vectors.iter()) {
                candidate.score = cosine_similarity(&query_vector, vector);
            }
            candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        }

        Ok(candidates
            .into_iter()
            .map(|candidate| {
                let mut metadata = candidate.entry.metadata.clone();
                P::shape(&mut metadata);
                metadata.insert("source".to_string(), Value::from(P::SOURCE_TYPE.as_str()));

                SearchHit::new(
                    candidate.entry.id.clone(),
                    candidate.entry.content.clone(),
                    clamp_score(candidate.score),
                    P::SOURCE_TYPE,
                    source.id().clone(),
                )
                .with_metadata(metadata)
            })
            .collect())
    }

    async fn describe(&self, source: &DataSource) -> AdapterDescription {
        let (healthy, indexed_items, detail) = match self.store.get(source.id()).await {
            Ok(Some(index)) => (true, index.len(), None),
            Ok(None) if source.is_ready() => (
                false,
                0,
                Some("source is ready but no index is published".to_string()),
            ),
            Ok(None) => (true, 0, None),
            Err(e) => (false, 0, Some(e.to_string())),
        };

        AdapterDescription {
            source_id: source.id().clone(),
            source_type: P::SOURCE_TYPE,
            healthy,
            indexed_items,
            detail,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::embedding::EmbeddingModelSpec;
    use crate::domain::index_build::BackendKind;
    use crate::domain::index_store::{IndexEntry, MockVectorIndexStore, SourceIndex};
    use crate::domain::source::SourceId;
    use crate::infrastructure::embedding::{HashingEmbedder, HashingEmbedderLoader};
    use crate::infrastructure::index_store::InMemoryVectorIndexStore;

    pub struct PlainProfile;

    impl MetadataProfile for PlainProfile {
        const SOURCE_TYPE: SourceType = SourceType::Document;

        fn shape(_metadata: &mut HashMap<String, Value>) {}
    }

    /// Publish an index of `(id, content, metadata)` entries for `source`
    pub async fn publish_entries(
        store: &InMemoryVectorIndexStore,
        source: &str,
        entries: Vec<(&str, &str, HashMap<String, Value>)>,
    ) {
        let model = EmbeddingModelSpec::new("m1", 64);
        let embedder = HashingEmbedder::new(&model).unwrap();
        let entries = entries
            .into_iter()
            .map(|(id, content, metadata)| IndexEntry {
                id: id.to_string(),
                content: content.to_string(),
                metadata,
                vector: embedder.embed_text(content),
            })
            .collect();

        store
            .publish(vec![SourceIndex::new(
                SourceId::new(source).unwrap(),
                "test",
                BackendKind::Hnsw,
                model,
                entries,
            )])
            .await
            .unwrap();
    }

    fn adapter(store: Arc<dyn VectorIndexStore>) -> IndexedAdapter<PlainProfile> {
        IndexedAdapter::new(store, Arc::new(HashingEmbedderLoader::new()))
    }

    fn source() -> DataSource {
        DataSource::new(
            SourceId::new("docs").unwrap(),
            "Docs",
            SourceType::Document,
            HashMap::new(),
        )
    }

    #[test]
    fn test_promote() {
        let mut metadata = HashMap::from([("subject".to_string(), Value::from("Hi"))]);
        promote(&mut metadata, "title", &["subject", "name"]);
        assert_eq!(metadata["title"], Value::from("Hi"));

        metadata.insert("name".to_string(), Value::from("Other"));
        promote(&mut metadata, "title", &["name"]);
        assert_eq!(metadata["title"], Value::from("Hi"));
    }

    #[tokio::test]
    async fn test_search_ranks_matching_content_first() {
        let store = Arc::new(InMemoryVectorIndexStore::new());
        publish_entries(
            &store,
            "docs",
            vec![
                ("a", "lunch menu for the week", HashMap::new()),
                ("b", "the deadline is friday", HashMap::new()),
            ],
        )
        .await;

        let hits = adapter(store)
            .search(&source(), &SearchQuery::new("deadline", 5))
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "b");
        assert!(hits.iter().all(|h| (0.0..=1.0).contains(&h.score)));
        assert_eq!(hits[0].source_id.as_str(), "docs");
        assert_eq!(hits[0].metadata["source"], Value::from("document"));
    }

    #[tokio::test]
    async fn test_recompute_embeddings_keeps_ranking() {
        let store = Arc::new(InMemoryVectorIndexStore::new());
        publish_entries(
            &store,
            "docs",
            vec![
                ("a", "lunch menu", HashMap::new()),
                ("b", "deadline friday", HashMap::new()),
            ],
        )
        .await;

        let query = SearchQuery::new("deadline", 1).with_recompute_embeddings(true);
        let hits = adapter(store).search(&source(), &query).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");
    }

    #[tokio::test]
    async fn test_missing_index_is_adapter_error() {
        let store = Arc::new(InMemoryVectorIndexStore::new());
        let result = adapter(store)
            .search(&source(), &SearchQuery::new("deadline", 5))
            .await;

        assert!(matches!(result, Err(DomainError::Adapter { .. })));
    }

    #[tokio::test]
    async fn test_describe_reports_store_failure() {
        let mut store = MockVectorIndexStore::new();
        store
            .expect_get()
            .returning(|_| Err(DomainError::backend_unavailable("down")));

        let description = adapter(Arc::new(store)).describe(&source()).await;
        assert!(!description.healthy);
        assert!(description.detail.unwrap().contains("down"));
    }
}
