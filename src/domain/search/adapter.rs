//! Per-source search adapter trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use super::{SearchHit, SearchQuery};
use crate::domain::DomainError;
use crate::domain::source::{DataSource, SourceId, SourceType};

/// Health summary of one source as seen by its adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterDescription {
    pub source_id: SourceId,
    pub source_type: SourceType,
    pub healthy: bool,
    pub indexed_items: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Searches one kind of source
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Source type served by this adapter
    fn source_type(&self) -> SourceType;

    /// Return up to `query.top_k` candidates from `source`
    async fn search(
        &self,
        source: &DataSource,
        query: &SearchQuery,
    ) -> Result<Vec<SearchHit>, DomainError>;

    async fn describe(&self, source: &DataSource) -> AdapterDescription;
}
