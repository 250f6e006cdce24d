//! Vector index store trait

use std::sync::Arc;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::SourceIndex;
use crate::domain::error::DomainError;
use crate::domain::source::SourceId;

/// Holds the active index of every indexed source
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VectorIndexStore: Send + Sync {
    /// Make a set of staged indices visible, replacing any previous index
    /// of the same sources in one step
    async fn publish(&self, indices: Vec<SourceIndex>) -> Result<(), DomainError>;

    /// Active index of a source
    async fn get(&self, source_id: &SourceId) -> Result<Option<Arc<SourceIndex>>, DomainError>;

    /// Drop the index of a source
    async fn remove(&self, source_id: &SourceId) -> Result<bool, DomainError>;

    /// Total entries across all active indices
    async fn entry_count(&self) -> Result<usize, DomainError>;

    /// Fails with `BackendUnavailable` when the store cannot be reached
    async fn health_check(&self) -> Result<(), DomainError>;
}
