//! Embedding model identifiers and the model catalog

use serde::{Deserialize, Serialize};

/// A supported embedding model and its output dimensionality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingModelSpec {
    pub id: String,
    pub dimensions: usize,
}

impl EmbeddingModelSpec {
    pub fn new(id: impl Into<String>, dimensions: usize) -> Self {
        Self {
            id: id.into(),
            dimensions,
        }
    }
}

/// Catalog of recognized embedding model identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingModelCatalog {
    models: Vec<EmbeddingModelSpec>,
}

impl EmbeddingModelCatalog {
    pub fn new(models: Vec<EmbeddingModelSpec>) -> Self {
        Self { models }
    }

    /// Look up a model by identifier (exact match)
    pub fn resolve(&self, id: &str) -> Option<&EmbeddingModelSpec> {
        self.models.iter().find(|m| m.id == id.trim())
    }

    pub fn models(&self) -> &[EmbeddingModelSpec] {
        &self.models
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for EmbeddingModelCatalog {
    fn default() -> Self {
        Self::new(vec![
            EmbeddingModelSpec::new("sentence-transformers/all-MiniLM-L6-v2", 384),
            EmbeddingModelSpec::new("sentence-transformers/all-mpnet-base-v2", 768),
            EmbeddingModelSpec::new("sentence-transformers/all-distilroberta-v1", 768),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = EmbeddingModelCatalog::default();

        let model = catalog
            .resolve("sentence-transformers/all-MiniLM-L6-v2")
            .expect("default model should be present");
        assert_eq!(model.dimensions, 384);
        assert!(catalog.resolve("all-MiniLM-L6-v2").is_none());
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_resolve_trims_input() {
        let catalog = EmbeddingModelCatalog::new(vec![EmbeddingModelSpec::new("m1", 8)]);
        assert!(catalog.resolve("  m1 ").is_some());
    }
}
