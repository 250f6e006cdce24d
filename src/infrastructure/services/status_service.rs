//! Status aggregator - derives one readiness snapshot for the whole system

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{instrument, warn};

use super::index_build_service::IndexBuildOrchestrator;
use super::source_service::{SourceFilter, SourceRegistry};
use crate::domain::error::DomainError;
use crate::domain::index_build::BackendKind;
use crate::domain::index_store::VectorIndexStore;
use crate::domain::source::SourceStatus;
use crate::domain::status::{SystemState, SystemStatus};

/// Reported when no build has completed yet
#[derive(Debug, Clone)]
pub struct StatusDefaults {
    pub backend: BackendKind,
    pub embedding_model: String,
}

/// Trait for the status aggregator (for dynamic dispatch in AppState)
#[async_trait]
pub trait StatusAggregator: Send + Sync + Debug {
    async fn get_status(&self) -> Result<SystemStatus, DomainError>;
}

pub struct StatusService {
    registry: Arc<dyn SourceRegistry>,
    builds: Arc<dyn IndexBuildOrchestrator>,
    store: Arc<dyn VectorIndexStore>,
    defaults: StatusDefaults,
}

impl Debug for StatusService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusService")
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl StatusService {
    pub fn new(
        registry: Arc<dyn SourceRegistry>,
        builds: Arc<dyn IndexBuildOrchestrator>,
        store: Arc<dyn VectorIndexStore>,
        defaults: StatusDefaults,
    ) -> Self {
        Self {
            registry,
            builds,
            store,
            defaults,
        }
    }
}

#[async_trait]
impl StatusAggregator for StatusService {
    #[instrument(skip(self))]
    async fn get_status(&self) -> Result<SystemStatus, DomainError> {
        let sources = self.registry.list(&SourceFilter::default()).await?;
        let count = |status: SourceStatus| sources.iter().filter(|s| s.status() == status).count();

        let ready_sources = count(SourceStatus::Ready);
        let indexing_sources = count(SourceStatus::Indexing);
        let error_sources = count(SourceStatus::Error);

        let active_builds = self
            .builds
            .list_jobs()
            .await?
            .iter()
            .filter(|job| !job.is_terminal())
            .count();

        let latest = self.builds.list_indices().await?.into_iter().next();
        let (backend_name, embedding_model, index_path) = match latest {
            Some(record) => (
                record.backend.as_str().to_string(),
                record.embedding_model,
                Some(record.path),
            ),
            None => (
                self.defaults.backend.as_str().to_string(),
                self.defaults.embedding_model.clone(),
                None,
            ),
        };

        let reachable = match self.store.health_check().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Vector index store is unreachable");
                false
            }
        };

        let (status, total_documents) = if !reachable {
            (SystemState::Error, 0)
        } else if ready_sources == 0 {
            (SystemState::NoIndex, 0)
        } else {
            let total = sources
                .iter()
                .filter(|s| s.is_ready())
                .map(|s| s.item_count())
                .sum::<u64>();
            (SystemState::Ready, total)
        };

        Ok(SystemStatus {
            status,
            index_loaded: status == SystemState::Ready,
            index_path,
            total_documents,
            backend_name,
            embedding_model,
            ready_sources,
            indexing_sources,
            error_sources,
            active_builds,
        })
    }
}
