//! Source repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{DataSource, SourceId};
use crate::domain::error::DomainError;

/// Storage for data sources with optimistic concurrency
///
/// Implementations must make `insert`, `compare_and_swap` and `delete`
/// atomic with respect to each other.
#[async_trait]
pub trait SourceRepository: Send + Sync + Debug {
    /// Get a source by ID
    async fn get(&self, id: &SourceId) -> Result<Option<DataSource>, DomainError>;

    /// List all sources in registration order
    async fn list(&self) -> Result<Vec<DataSource>, DomainError>;

    /// Insert a new source and assign its registration sequence.
    ///
    /// Fails with `Validation` when the name is taken (case-insensitive)
    /// and with `Conflict` when the ID is taken.
    async fn insert(&self, source: DataSource) -> Result<DataSource, DomainError>;

    /// Replace the stored source if its version still equals
    /// `expected_version`; the stored copy gets version `expected_version + 1`.
    async fn compare_and_swap(
        &self,
        source: DataSource,
        expected_version: u64,
    ) -> Result<DataSource, DomainError>;

    /// Delete a source if its version still equals `expected_version`
    async fn delete(&self, id: &SourceId, expected_version: u64) -> Result<bool, DomainError>;
}
