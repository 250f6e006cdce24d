//! In-memory vector index store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::DomainError;
use crate::domain::index_store::{SourceIndex, VectorIndexStore};
use crate::domain::source::SourceId;

/// Keeps every active source index in memory
#[derive(Debug, Default)]
pub struct InMemoryVectorIndexStore {
    indices: RwLock<HashMap<String, Arc<SourceIndex>>>,
}

impl InMemoryVectorIndexStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndexStore for InMemoryVectorIndexStore {
    async fn publish(&self, indices: Vec<SourceIndex>) -> Result<(), DomainError> {
        let mut active = self.indices.write().await;

        for index in indices {
            info!(
                source_id = %index.source_id,
                index_name = %index.index_name,
                entries = index.len(),
                "Published source index"
            );
            active.insert(index.source_id.as_str().to_string(), Arc::new(index));
        }

        Ok(())
    }

    async fn get(&self, source_id: &SourceId) -> Result<Option<Arc<SourceIndex>>, DomainError> {
        Ok(self.indices.read().await.get(source_id.as_str()).cloned())
    }

    async fn remove(&self, source_id: &SourceId) -> Result<bool, DomainError> {
        Ok(self
            .indices
            .write()
            .await
            .remove(source_id.as_str())
            .is_some())
    }

    async fn entry_count(&self) -> Result<usize, DomainError> {
        Ok(self.indices.read().await.values().map(|i| i.len()).sum())
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::embedding::EmbeddingModelSpec;
    use crate::domain::index_build::BackendKind;
    use crate::domain::index_store::IndexEntry;

    fn index(source: &str, name: &str, entries: usize) -> SourceIndex {
        SourceIndex::new(
            SourceId::new(source).unwrap(),
            name,
            BackendKind::Hnsw,
            EmbeddingModelSpec::new("m1", 2),
            (0..entries)
                .map(|i| IndexEntry {
                    id: format!("{}-{}", source, i),
                    content: "text".to_string(),
                    metadata: HashMap::new(),
                    vector: vec![1.0, 0.0],
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_publish_and_get() {
        let store = InMemoryVectorIndexStore::new();
        store
            .publish(vec![index("docs", "first", 2), index("mail", "first", 3)])
            .await
            .unwrap();

        let docs = store
            .get(&SourceId::new("docs").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(store.entry_count().await.unwrap(), 5);
        assert!(store.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_publish_replaces_previous_index() {
        let store = InMemoryVectorIndexStore::new();
        store.publish(vec![index("docs", "first", 2)]).await.unwrap();
        store.publish(vec![index("docs", "second", 4)]).await.unwrap();

        let docs = store
            .get(&SourceId::new("docs").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(docs.index_name, "second");
        assert_eq!(store.entry_count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = InMemoryVectorIndexStore::new();
        let id = SourceId::new("docs").unwrap();
        store.publish(vec![index("docs", "first", 1)]).await.unwrap();

        assert!(store.remove(&id).await.unwrap());
        assert!(!store.remove(&id).await.unwrap());
        assert!(store.get(&id).await.unwrap().is_none());
    }
}
