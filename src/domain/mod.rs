//! Domain layer - Core business logic and entities

pub mod corpus;
pub mod embedding;
pub mod error;
pub mod index_build;
pub mod index_store;
pub mod ingestion;
pub mod search;
pub mod source;
pub mod status;

pub use corpus::{RawDocument, SourceCorpus};
pub use embedding::{EmbeddingModelCatalog, EmbeddingModelLoader, EmbeddingModelSpec, TextEmbedder};
pub use error::DomainError;
pub use index_build::{
    BackendKind, BuildRequest, BuildSpec, BuildStage, BuildTarget, IndexBuildJob, IndexBuilder,
    IndexJobRepository, JobId,
};
pub use index_store::{IndexEntry, SourceIndex, VectorIndexStore};
pub use ingestion::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
pub use search::{
    AdapterDescription, DegradedReason, DegradedSource, Highlights, SearchHit, SearchQuery,
    SearchResponse, SourceAdapter, TextSpan,
};
pub use source::{
    DataSource, SourceConfig, SourceId, SourceRepository, SourceStatus, SourceType,
};
pub use status::{SystemState, SystemStatus};
