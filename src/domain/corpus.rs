//! Raw source content awaiting indexing

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;
use crate::domain::source::{DataSource, SourceId};

/// Maximum raw document size accepted for upload (bytes)
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// A raw document belonging to one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.trim().is_empty() {
            return Err(DomainError::validation("Document id cannot be empty"));
        }

        if self.content.len() > MAX_DOCUMENT_BYTES {
            return Err(DomainError::validation(format!(
                "Document '{}' exceeds maximum size of {} bytes",
                self.id, MAX_DOCUMENT_BYTES
            )));
        }

        Ok(())
    }
}

/// Access to the raw documents of each source
#[async_trait]
pub trait SourceCorpus: Send + Sync + Debug {
    /// Read every raw document of a source
    async fn load(&self, source: &DataSource) -> Result<Vec<RawDocument>, DomainError>;

    /// Store uploaded documents, replacing ones with the same id.
    /// Returns the number of uploaded documents now held for the source.
    async fn add_documents(
        &self,
        source_id: &SourceId,
        documents: Vec<RawDocument>,
    ) -> Result<usize, DomainError>;

    /// Forget every uploaded document of a source
    async fn remove_source(&self, source_id: &SourceId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_builder() {
        let doc = RawDocument::new("d1", "body")
            .with_title("Title")
            .with_metadata("author", "ana");

        assert_eq!(doc.title.as_deref(), Some("Title"));
        assert_eq!(doc.metadata["author"], Value::from("ana"));
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_document_requires_id() {
        assert!(RawDocument::new(" ", "body").validate().is_err());
    }

    #[test]
    fn test_deserialize_defaults() {
        let doc: RawDocument =
            serde_json::from_str(r#"{"id":"d1","content":"hello"}"#).unwrap();
        assert!(doc.title.is_none());
        assert!(doc.metadata.is_empty());
    }
}
