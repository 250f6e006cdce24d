//! In-memory build job repository implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::error::DomainError;
use crate::domain::index_build::{IndexBuildJob, IndexJobRepository, JobId, JobMutation};

/// In-memory implementation of IndexJobRepository
#[derive(Debug)]
pub struct InMemoryIndexJobRepository {
    jobs: Arc<RwLock<HashMap<String, IndexBuildJob>>>,
}

impl InMemoryIndexJobRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryIndexJobRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexJobRepository for InMemoryIndexJobRepository {
    async fn get(&self, id: &JobId) -> Result<Option<IndexBuildJob>, DomainError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.get(id.as_str()).cloned())
    }

    async fn create(&self, job: IndexBuildJob) -> Result<IndexBuildJob, DomainError> {
        let mut jobs = self.jobs.write().await;
        let id = job.id().as_str().to_string();

        if jobs.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Build job '{}' already exists",
                id
            )));
        }

        jobs.insert(id, job.clone());
        Ok(job)
    }

    async fn list(&self) -> Result<Vec<IndexBuildJob>, DomainError> {
        let jobs = self.jobs.read().await;
        let mut all: Vec<IndexBuildJob> = jobs.values().cloned().collect();
        all.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(all)
    }

    async fn modify(
        &self,
        id: &JobId,
        mutation: JobMutation,
    ) -> Result<IndexBuildJob, DomainError> {
        let mut jobs = self.jobs.write().await;

        let current = jobs
            .get(id.as_str())
            .ok_or_else(|| DomainError::not_found(format!("Build job '{}'", id)))?;

        let mut updated = current.clone();
        mutation(&mut updated)?;

        jobs.insert(id.as_str().to_string(), updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: &JobId) -> Result<bool, DomainError> {
        let mut jobs = self.jobs.write().await;
        Ok(jobs.remove(id.as_str()).is_some())
    }

    async fn delete_terminal_before(&self, before: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut jobs = self.jobs.write().await;
        let expired: Vec<String> = jobs
            .iter()
            .filter(|(_, job)| {
                job.is_terminal() && job.completed_at().is_some_and(|at| at < before)
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            jobs.remove(id);
        }

        Ok(expired.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::index_build::repository::tests::{
        create_test_job, test_repository_basic_crud, test_repository_delete_terminal_before,
        test_repository_modify,
    };

    #[tokio::test]
    async fn test_basic_crud() {
        let repo = InMemoryIndexJobRepository::new();
        test_repository_basic_crud(&repo).await;
    }

    #[tokio::test]
    async fn test_modify() {
        let repo = InMemoryIndexJobRepository::new();
        test_repository_modify(&repo).await;
    }

    #[tokio::test]
    async fn test_delete_terminal_before() {
        let repo = InMemoryIndexJobRepository::new();
        test_repository_delete_terminal_before(&repo).await;
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let repo = InMemoryIndexJobRepository::new();
        let job = create_test_job("docs", "docs");

        repo.create(job.clone()).await.expect("first create should succeed");

        let result = repo.create(job).await;
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = InMemoryIndexJobRepository::new();
        let first = repo.create(create_test_job("a", "a")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = repo.create(create_test_job("b", "b")).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed[0].id(), second.id());
        assert_eq!(listed[1].id(), first.id());
    }
}
