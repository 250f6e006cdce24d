//! Source registry service - lifecycle bookkeeping for data sources

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::domain::corpus::{RawDocument, SourceCorpus};
use crate::domain::error::DomainError;
use crate::domain::index_store::VectorIndexStore;
use crate::domain::source::{
    DataSource, SourceConfig, SourceId, SourceRepository, SourceStatus, SourceType,
    validate_source_config, validate_source_name,
};

/// Request to register a new data source
#[derive(Debug, Clone)]
pub struct RegisterSourceRequest {
    /// Explicit ID; generated when absent
    pub id: Option<String>,
    pub name: String,
    pub source_type: SourceType,
    pub config: SourceConfig,
}

/// Administrative edit of an existing source
#[derive(Debug, Clone, Default)]
pub struct EditSourceRequest {
    pub name: Option<String>,
    pub config: Option<SourceConfig>,
}

/// Fields written alongside a status transition
#[derive(Debug, Clone, Default)]
pub struct StatusFields {
    pub item_count: Option<u64>,
    pub last_indexed: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

/// Filter for listing sources; empty vectors match everything
#[derive(Debug, Clone, Default)]
pub struct SourceFilter {
    pub types: Vec<SourceType>,
    pub statuses: Vec<SourceStatus>,
}

impl SourceFilter {
    pub fn with_statuses(statuses: Vec<SourceStatus>) -> Self {
        Self {
            types: Vec::new(),
            statuses,
        }
    }

    fn matches(&self, source: &DataSource) -> bool {
        (self.types.is_empty() || self.types.contains(&source.source_type()))
            && (self.statuses.is_empty() || self.statuses.contains(&source.status()))
    }
}

/// Trait for the source registry (for dynamic dispatch in AppState)
#[async_trait]
pub trait SourceRegistry: Send + Sync + Debug {
    /// Register a source with status `configured` and version 0
    async fn register(&self, request: RegisterSourceRequest) -> Result<DataSource, DomainError>;

    /// Apply a lifecycle transition if `expected_version` is current
    async fn update_status(
        &self,
        id: &SourceId,
        expected_version: u64,
        status: SourceStatus,
        fields: StatusFields,
    ) -> Result<DataSource, DomainError>;

    /// Restore an `indexing` source to its pre-build status after a cancel
    async fn revert_indexing(
        &self,
        id: &SourceId,
        expected_version: u64,
        restore_to: SourceStatus,
    ) -> Result<DataSource, DomainError>;

    /// Snapshot of sources in registration order
    async fn list(&self, filter: &SourceFilter) -> Result<Vec<DataSource>, DomainError>;

    async fn get(&self, id: &SourceId) -> Result<DataSource, DomainError>;

    async fn edit(
        &self,
        id: &SourceId,
        expected_version: u64,
        request: EditSourceRequest,
    ) -> Result<DataSource, DomainError>;

    /// Remove a source together with its raw documents and published index
    async fn deregister(&self, id: &SourceId) -> Result<(), DomainError>;

    /// Upload raw documents for the next build; returns the number held
    async fn add_documents(
        &self,
        id: &SourceId,
        documents: Vec<RawDocument>,
    ) -> Result<usize, DomainError>;
}

/// Source registry backed by a [`SourceRepository`]
pub struct SourceService {
    repository: Arc<dyn SourceRepository>,
    corpus: Arc<dyn SourceCorpus>,
    store: Arc<dyn VectorIndexStore>,
}

impl Debug for SourceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceService")
            .field("repository", &self.repository)
            .finish()
    }
}

impl SourceService {
    pub fn new(
        repository: Arc<dyn SourceRepository>,
        corpus: Arc<dyn SourceCorpus>,
        store: Arc<dyn VectorIndexStore>,
    ) -> Self {
        Self {
            repository,
            corpus,
            store,
        }
    }

    async fn get_checked(
        &self,
        id: &SourceId,
        expected_version: u64,
    ) -> Result<DataSource, DomainError> {
        let source = self.get(id).await?;

        if source.version() != expected_version {
            return Err(DomainError::conflict(format!(
                "Data source '{}' is at version {}, not {}",
                id,
                source.version(),
                expected_version
            )));
        }

        Ok(source)
    }
}

#[async_trait]
impl SourceRegistry for SourceService {
    #[instrument(skip(self, request), fields(name = %request.name, source_type = %request.source_type))]
    async fn register(&self, request: RegisterSourceRequest) -> Result<DataSource, DomainError> {
        let id = match request.id {
            Some(id) => SourceId::new(id.trim())?,
            None => SourceId::generate(),
        };
        let name = validate_source_name(&request.name)?;
        validate_source_config(&request.config)?;

        let source = self
            .repository
            .insert(DataSource::new(id, name, request.source_type, request.config))
            .await?;

        info!(source_id = %source.id(), "Registered data source");
        Ok(source)
    }

    #[instrument(skip(self, fields), fields(source_id = %id))]
    async fn update_status(
        &self,
        id: &SourceId,
        expected_version: u64,
        status: SourceStatus,
        fields: StatusFields,
    ) -> Result<DataSource, DomainError> {
        let mut source = self.get_checked(id, expected_version).await?;

        if !source.status().can_transition_to(status) {
            return Err(DomainError::conflict(format!(
                "Data source '{}' cannot move from {} to {}",
                id,
                source.status(),
                status
            )));
        }

        let previous = source.status();
        source.set_status(status);

        if let Some(item_count) = fields.item_count {
            source.set_item_count(item_count);
        }
        if let Some(at) = fields.last_indexed {
            source.set_last_indexed(at);
        }
        match status {
            SourceStatus::Error => source.set_error_message(fields.error_message),
            SourceStatus::Ready => source.set_error_message(None),
            _ => {}
        }

        let updated = self
            .repository
            .compare_and_swap(source, expected_version)
            .await?;

        debug!(
            from = %previous,
            to = %status,
            version = updated.version(),
            "Updated data source status"
        );
        Ok(updated)
    }

    #[instrument(skip(self), fields(source_id = %id))]
    async fn revert_indexing(
        &self,
        id: &SourceId,
        expected_version: u64,
        restore_to: SourceStatus,
    ) -> Result<DataSource, DomainError> {
        let mut source = self.get_checked(id, expected_version).await?;

        if source.status() != SourceStatus::Indexing || !restore_to.is_restorable() {
            return Err(DomainError::conflict(format!(
                "Data source '{}' cannot be reverted from {} to {}",
                id,
                source.status(),
                restore_to
            )));
        }

        source.set_status(restore_to);
        let updated = self
            .repository
            .compare_and_swap(source, expected_version)
            .await?;

        debug!(to = %restore_to, "Reverted data source after cancelled build");
        Ok(updated)
    }

    async fn list(&self, filter: &SourceFilter) -> Result<Vec<DataSource>, DomainError> {
        let sources = self.repository.list().await?;
        Ok(sources.into_iter().filter(|s| filter.matches(s)).collect())
    }

    async fn get(&self, id: &SourceId) -> Result<DataSource, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Data source '{}' not found", id)))
    }

    #[instrument(skip(self, request), fields(source_id = %id))]
    async fn edit(
        &self,
        id: &SourceId,
        expected_version: u64,
        request: EditSourceRequest,
    ) -> Result<DataSource, DomainError> {
        let mut source = self.get_checked(id, expected_version).await?;

        if let Some(name) = request.name {
            source.set_name(validate_source_name(&name)?);
        }

        if let Some(config) = request.config {
            validate_source_config(&config)?;
            source.set_config(config);
        }

        let updated = self
            .repository
            .compare_and_swap(source, expected_version)
            .await?;

        info!(version = updated.version(), "Edited data source");
        Ok(updated)
    }

    #[instrument(skip(self), fields(source_id = %id))]
    async fn deregister(&self, id: &SourceId) -> Result<(), DomainError> {
        let source = self.get(id).await?;

        if source.status() == SourceStatus::Indexing {
            return Err(DomainError::conflict(format!(
                "Data source '{}' is being indexed",
                id
            )));
        }

        if !self.repository.delete(id, source.version()).await? {
            return Err(DomainError::not_found(format!("Data source '{}' not found", id)));
        }

        if let Err(e) = self.corpus.remove_source(id).await {
            warn!(error = %e, "Failed to drop raw documents of removed source");
        }
        if let Err(e) = self.store.remove(id).await {
            warn!(error = %e, "Failed to drop index of removed source");
        }

        info!("Deregistered data source");
        Ok(())
    }

    #[instrument(skip(self, documents), fields(source_id = %id, count = documents.len()))]
    async fn add_documents(
        &self,
        id: &SourceId,
        documents: Vec<RawDocument>,
    ) -> Result<usize, DomainError> {
        self.get(id).await?;

        if documents.is_empty() {
            return Err(DomainError::validation("At least one document is required"));
        }

        let held = self.corpus.add_documents(id, documents).await?;
        debug!(held, "Stored raw documents");
        Ok(held)
    }
}
