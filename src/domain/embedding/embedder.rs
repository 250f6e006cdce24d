//! Text embedder traits

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use super::EmbeddingModelSpec;
use crate::domain::DomainError;

/// A loaded embedding model
#[async_trait]
pub trait TextEmbedder: Send + Sync + Debug {
    /// Identifier of the model this embedder implements
    fn model_id(&self) -> &str;

    /// Output dimensionality
    fn dimensions(&self) -> usize;

    /// Embed a batch of texts, one vector per input in order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError>;

    /// Embed a single text
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        self.embed(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| DomainError::internal("Embedder returned no vector"))
    }
}

/// Loads embedding models by catalog entry
#[async_trait]
pub trait EmbeddingModelLoader: Send + Sync + Debug {
    async fn load(&self, model: &EmbeddingModelSpec) -> Result<Arc<dyn TextEmbedder>, DomainError>;
}
