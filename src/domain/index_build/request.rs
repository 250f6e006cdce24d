//! Index build requests and their validation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::embedding::{EmbeddingModelCatalog, EmbeddingModelSpec};
use crate::domain::ingestion::ChunkingConfig;
use crate::domain::source::SourceId;

/// Maximum length for index names
pub const MAX_INDEX_NAME_LENGTH: usize = 100;

/// Vector index backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Hnsw,
    Diskann,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hnsw => "hnsw",
            Self::Diskann => "diskann",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hnsw" => Ok(Self::Hnsw),
            "diskann" => Ok(Self::Diskann),
            other => Err(DomainError::validation(format!(
                "Unsupported backend '{}': expected 'hnsw' or 'diskann'",
                other
            ))),
        }
    }
}

/// An index build request as submitted by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub name: String,
    pub source_ids: Vec<String>,
    pub embedding_model: String,
    pub backend: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl BuildRequest {
    pub fn new(name: impl Into<String>, source_ids: Vec<String>) -> Self {
        Self {
            name: name.into(),
            source_ids,
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            backend: BackendKind::Hnsw.as_str().to_string(),
            chunk_size: ChunkingConfig::default().chunk_size,
            chunk_overlap: ChunkingConfig::default().chunk_overlap,
        }
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    /// Validate the request shape against the model catalog.
    ///
    /// Source existence and status are checked by the orchestrator, which
    /// owns the registry.
    pub fn validate(&self, catalog: &EmbeddingModelCatalog) -> Result<BuildSpec, DomainError> {
        let name = self.name.trim();

        if name.is_empty() {
            return Err(DomainError::validation("Index name cannot be empty"));
        }

        if name.chars().count() > MAX_INDEX_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Index name exceeds maximum length of {} characters",
                MAX_INDEX_NAME_LENGTH
            )));
        }

        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(DomainError::validation(format!(
                "Index name '{}' must not contain path separators",
                name
            )));
        }

        let mut source_ids: Vec<SourceId> = Vec::with_capacity(self.source_ids.len());
        for raw in &self.source_ids {
            let id = SourceId::new(raw.trim()).map_err(|e| {
                DomainError::validation(format!("Unknown data source '{}': {}", raw, e))
            })?;
            if !source_ids.contains(&id) {
                source_ids.push(id);
            }
        }

        if source_ids.is_empty() {
            return Err(DomainError::validation(
                "At least one data source must be selected",
            ));
        }

        let chunking = ChunkingConfig::new(self.chunk_size, self.chunk_overlap);
        chunking.validate()?;

        let backend: BackendKind = self.backend.parse()?;

        let embedding_model = catalog
            .resolve(&self.embedding_model)
            .cloned()
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "Unrecognized embedding model '{}'",
                    self.embedding_model
                ))
            })?;

        Ok(BuildSpec {
            name: name.to_string(),
            source_ids,
            embedding_model,
            backend,
            chunking,
        })
    }
}

/// A validated build request, stored on the job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    pub name: String,
    pub source_ids: Vec<SourceId>,
    pub embedding_model: EmbeddingModelSpec,
    pub backend: BackendKind,
    pub chunking: ChunkingConfig,
}
