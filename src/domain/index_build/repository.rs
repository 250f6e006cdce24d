//! Build job repository trait

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{IndexBuildJob, JobId};
use crate::domain::error::DomainError;

/// Mutation applied atomically to a stored job
pub type JobMutation = Box<dyn FnOnce(&mut IndexBuildJob) -> Result<(), DomainError> + Send>;

/// Storage for build jobs
#[async_trait]
pub trait IndexJobRepository: Send + Sync + Debug {
    async fn get(&self, id: &JobId) -> Result<Option<IndexBuildJob>, DomainError>;

    async fn create(&self, job: IndexBuildJob) -> Result<IndexBuildJob, DomainError>;

    /// List jobs, newest first
    async fn list(&self) -> Result<Vec<IndexBuildJob>, DomainError>;

    /// Apply `mutation` under the store's write lock. If the mutation
    /// fails the stored job is left untouched.
    async fn modify(&self, id: &JobId, mutation: JobMutation)
    -> Result<IndexBuildJob, DomainError>;

    async fn delete(&self, id: &JobId) -> Result<bool, DomainError>;

    /// Delete terminal jobs that completed before `before`
    async fn delete_terminal_before(&self, before: DateTime<Utc>) -> Result<u64, DomainError>;
}
