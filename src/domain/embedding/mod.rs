//! Embedding model domain types and traits

mod embedder;
mod model;
mod similarity;

pub use embedder::{EmbeddingModelLoader, TextEmbedder};
pub use model::{EmbeddingModelCatalog, EmbeddingModelSpec};
pub use similarity::{cosine_similarity, l2_normalize};

#[cfg(test)]
pub use embedder::mock::MockTextEmbedder;
