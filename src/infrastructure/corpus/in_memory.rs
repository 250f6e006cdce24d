//! In-memory store for uploaded documents

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::DomainError;
use crate::domain::corpus::{RawDocument, SourceCorpus};
use crate::domain::source::{DataSource, SourceId};

/// Holds uploaded documents per source, in upload order
#[derive(Debug, Default)]
pub struct InMemoryCorpus {
    documents: RwLock<HashMap<String, Vec<RawDocument>>>,
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploaded documents of a source
    pub async fn uploaded(&self, source_id: &SourceId) -> Vec<RawDocument> {
        self.documents
            .read()
            .await
            .get(source_id.as_str())
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl SourceCorpus for InMemoryCorpus {
    async fn load(&self, source: &DataSource) -> Result<Vec<RawDocument>, DomainError> {
        Ok(self.uploaded(source.id()).await)
    }

    async fn add_documents(
        &self,
        source_id: &SourceId,
        documents: Vec<RawDocument>,
    ) -> Result<usize, DomainError> {
        for document in &documents {
            document.validate()?;
        }

        let mut all = self.documents.write().await;
        let held = all.entry(source_id.as_str().to_string()).or_default();

        for document in documents {
            match held.iter_mut().find(|d| d.id == document.id) {
                Some(existing) => *existing = document,
                None => held.push(document),
            }
        }

        Ok(held.len())
    }

    async fn remove_source(&self, source_id: &SourceId) -> Result<(), DomainError> {
        self.documents.write().await.remove(source_id.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::source::repository::tests::create_test_source;
    use crate::domain::source::SourceType;

    #[tokio::test]
    async fn test_add_and_load() {
        let corpus = InMemoryCorpus::new();
        let source = create_test_source("docs", "Docs", SourceType::Document);

        let count = corpus
            .add_documents(
                source.id(),
                vec![RawDocument::new("a", "alpha"), RawDocument::new("b", "beta")],
            )
            .await
            .unwrap();
        assert_eq!(count, 2);

        let loaded = corpus.load(&source).await.unwrap();
        assert_eq!(loaded[0].id, "a");
        assert_eq!(loaded[1].id, "b");
    }

    #[tokio::test]
    async fn test_same_id_replaces() {
        let corpus = InMemoryCorpus::new();
        let id = SourceId::new("docs").unwrap();

        corpus
            .add_documents(&id, vec![RawDocument::new("a", "old")])
            .await
            .unwrap();
        let count = corpus
            .add_documents(&id, vec![RawDocument::new("a", "new")])
            .await
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(corpus.uploaded(&id).await[0].content, "new");
    }

    #[tokio::test]
    async fn test_invalid_document_rejected_whole_batch() {
        let corpus = InMemoryCorpus::new();
        let id = SourceId::new("docs").unwrap();

        let result = corpus
            .add_documents(
                &id,
                vec![RawDocument::new("a", "ok"), RawDocument::new("", "bad")],
            )
            .await;

        assert!(result.is_err());
        assert!(corpus.uploaded(&id).await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_source() {
        let corpus = InMemoryCorpus::new();
        let id = SourceId::new("docs").unwrap();
        corpus
            .add_documents(&id, vec![RawDocument::new("a", "x")])
            .await
            .unwrap();

        corpus.remove_source(&id).await.unwrap();
        assert!(corpus.uploaded(&id).await.is_empty());
    }
}
