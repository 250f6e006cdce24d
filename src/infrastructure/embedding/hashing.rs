//! Feature-hashing text embedder
//!
//! Each lower-cased Unicode word is hashed (FNV-1a, seeded with the model
//! id) into one of `dimensions` buckets; bucket counts are L2-normalized.
//! Vectors are non-negative, so cosine similarity stays within [0, 1].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::domain::DomainError;
use crate::domain::embedding::{
    EmbeddingModelLoader, EmbeddingModelSpec, TextEmbedder, l2_normalize,
};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(seed: u64, bytes: &[u8]) -> u64 {
    bytes.iter().fold(seed, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

/// Deterministic embedder standing in for a neural model
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    model_id: String,
    dimensions: usize,
    seed: u64,
}

impl HashingEmbedder {
    pub fn new(model: &EmbeddingModelSpec) -> Result<Self, DomainError> {
        if model.dimensions == 0 {
            return Err(DomainError::configuration(format!(
                "Embedding model '{}' must have at least one dimension",
                model.id
            )));
        }

        Ok(Self {
            model_id: model.id.clone(),
            dimensions: model.dimensions,
            seed: fnv1a(FNV_OFFSET, model.id.as_bytes()),
        })
    }

    /// Embed one text synchronously
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for word in text.unicode_words() {
            let word = word.to_lowercase();
            let bucket = fnv1a(self.seed, word.as_bytes()) % self.dimensions as u64;
            vector[bucket as usize] += 1.0;
        }

        l2_normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl TextEmbedder for HashingEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Loads hashing embedders and caches them per model id
#[derive(Debug, Default)]
pub struct HashingEmbedderLoader {
    loaded: RwLock<HashMap<String, Arc<HashingEmbedder>>>,
}

impl HashingEmbedderLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmbeddingModelLoader for HashingEmbedderLoader {
    async fn load(&self, model: &EmbeddingModelSpec) -> Result<Arc<dyn TextEmbedder>, DomainError> {
        if let Some(embedder) = self.loaded.read().await.get(&model.id) {
            if embedder.dimensions() == model.dimensions {
                return Ok(embedder.clone());
            }
        }

        let embedder = Arc::new(HashingEmbedder::new(model)?);
        self.loaded
            .write()
            .await
            .insert(model.id.clone(), embedder.clone());

        debug!(model = %model.id, dimensions = model.dimensions, "Loaded embedding model");
        Ok(embedder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::cosine_similarity;

    fn model() -> EmbeddingModelSpec {
        EmbeddingModelSpec::new("m1", 64)
    }

    #[test]
    fn test_vectors_are_normalized() {
        let embedder = HashingEmbedder::new(&model()).unwrap();
        let vector = embedder.embed_text("project deadline next friday");

        assert_eq!(vector.len(), 64);
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.0001);
        assert!(vector.iter().all(|x| *x >= 0.0));
    }

    #[test]
    fn test_deterministic_and_case_insensitive() {
        let embedder = HashingEmbedder::new(&model()).unwrap();
        assert_eq!(
            embedder.embed_text("Deadline Friday"),
            embedder.embed_text("deadline friday")
        );
    }

    #[test]
    fn test_shared_words_score_higher() {
        let embedder = HashingEmbedder::new(&model()).unwrap();
        let query = embedder.embed_text("deadline");
        let related = embedder.embed_text("the deadline is friday");
        let unrelated = embedder.embed_text("lunch menu");

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(&model()).unwrap();
        assert!(embedder.embed_text("  ").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let result = HashingEmbedder::new(&EmbeddingModelSpec::new("bad", 0));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_loader_caches_models() {
        let loader = HashingEmbedderLoader::new();
        let first = loader.load(&model()).await.unwrap();
        let second = loader.load(&model()).await.unwrap();

        assert_eq!(first.model_id(), "m1");
        assert_eq!(first.dimensions(), 64);
        assert_eq!(
            first.embed_one("hello").await.unwrap(),
            second.embed_one("hello").await.unwrap()
        );
    }
}
