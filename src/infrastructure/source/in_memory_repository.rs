//! In-memory source repository implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::error::DomainError;
use crate::domain::source::{DataSource, SourceId, SourceRepository};

#[derive(Debug, Default)]
struct Inner {
    sources: HashMap<String, DataSource>,
    next_seq: u64,
}

/// In-memory implementation of SourceRepository
#[derive(Debug)]
pub struct InMemorySourceRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemorySourceRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }
}

impl Default for InMemorySourceRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[async_trait]
impl SourceRepository for InMemorySourceRepository {
    async fn get(&self, id: &SourceId) -> Result<Option<DataSource>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.sources.get(id.as_str()).cloned())
    }

    async fn list(&self) -> Result<Vec<DataSource>, DomainError> {
        let inner = self.inner.read().await;
        let mut sources: Vec<DataSource> = inner.sources.values().cloned().collect();
        sources.sort_by_key(|s| s.registration_seq());
        Ok(sources)
    }

    async fn insert(&self, mut source: DataSource) -> Result<DataSource, DomainError> {
        let mut inner = self.inner.write().await;

        let key = name_key(source.name());
        if inner.sources.values().any(|s| name_key(s.name()) == key) {
            return Err(DomainError::validation(format!(
                "Data source name '{}' is already in use",
                source.name()
            )));
        }

        if inner.sources.contains_key(source.id().as_str()) {
            return Err(DomainError::conflict(format!(
                "Data source '{}' already exists",
                source.id()
            )));
        }

        inner.next_seq += 1;
        source.assign_registration_seq(inner.next_seq);
        inner
            .sources
            .insert(source.id().as_str().to_string(), source.clone());

        Ok(source)
    }

    async fn compare_and_swap(
        &self,
        mut source: DataSource,
        expected_version: u64,
    ) -> Result<DataSource, DomainError> {
        let mut inner = self.inner.write().await;

        let current = inner
            .sources
            .get(source.id().as_str())
            .ok_or_else(|| DomainError::not_found(format!("Data source '{}'", source.id())))?;

        if current.version() != expected_version {
            return Err(DomainError::conflict(format!(
                "Data source '{}' was modified concurrently (expected version {}, found {})",
                source.id(),
                expected_version,
                current.version()
            )));
        }

        let key = name_key(source.name());
        let name_taken = inner
            .sources
            .values()
            .any(|s| s.id() != source.id() && name_key(s.name()) == key);
        if name_taken {
            return Err(DomainError::validation(format!(
                "Data source name '{}' is already in use",
                source.name()
            )));
        }

        let seq = current.registration_seq();
        source.assign_registration_seq(seq);
        source.set_version(expected_version + 1);

        inner
            .sources
            .insert(source.id().as_str().to_string(), source.clone());

        Ok(source)
    }

    async fn delete(&self, id: &SourceId, expected_version: u64) -> Result<bool, DomainError> {
        let mut inner = self.inner.write().await;

        match inner.sources.get(id.as_str()) {
            None => Ok(false),
            Some(current) if current.version() != expected_version => {
                Err(DomainError::conflict(format!(
                    "Data source '{}' was modified concurrently (expected version {}, found {})",
                    id,
                    expected_version,
                    current.version()
                )))
            }
            Some(_) => {
                inner.sources.remove(id.as_str());
                Ok(true)
            }
        }
    }
}
