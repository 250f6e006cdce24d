//! Federated Search
//!
//! Searches heterogeneous content sources (documents, email, chat, code and
//! browser history) through one query, and builds their vector indices with
//! asynchronous, cancellable jobs:
//! - Source registry with version-checked lifecycle updates
//! - Staged index build orchestration with bounded concurrency
//! - Concurrent search fan-out with per-source timeouts
//! - Aggregated readiness status

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::info;

use api::state::{AppState, RequestDefaults};
use api::types::BuildDefaults;
use infrastructure::adapters::SourceAdapterRegistry;
use infrastructure::corpus::FilesystemCorpus;
use infrastructure::embedding::HashingEmbedderLoader;
use infrastructure::index_build::{InMemoryIndexJobRepository, LocalIndexBuilder};
use infrastructure::index_store::InMemoryVectorIndexStore;
use infrastructure::ingestion::FixedSizeChunker;
use infrastructure::services::{IndexBuildService, SearchService, SourceService, StatusService};
use infrastructure::source::InMemorySourceRepository;

/// Wire every service from configuration
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let catalog = config.indexing.catalog();

    if catalog.is_empty() {
        bail!("indexing.embedding_models must list at least one model");
    }

    catalog
        .resolve(&config.indexing.default_embedding_model)
        .with_context(|| {
            format!(
                "Default embedding model '{}' is not in indexing.embedding_models",
                config.indexing.default_embedding_model
            )
        })?;

    let store = Arc::new(InMemoryVectorIndexStore::new());
    let corpus = Arc::new(FilesystemCorpus::new(config.indexing.max_files_per_source));
    let models = Arc::new(HashingEmbedderLoader::new());

    let source_registry = Arc::new(SourceService::new(
        Arc::new(InMemorySourceRepository::new()),
        corpus.clone(),
        store.clone(),
    ));

    let builder = LocalIndexBuilder::new(
        corpus,
        Arc::new(FixedSizeChunker::new()),
        models.clone(),
        store.clone(),
    );
    let build_orchestrator = Arc::new(IndexBuildService::new(
        source_registry.clone(),
        Arc::new(InMemoryIndexJobRepository::new()),
        Arc::new(builder),
        catalog,
        config.indexing.build_config(),
    ));

    let adapters = Arc::new(SourceAdapterRegistry::with_defaults(store.clone(), models));
    let search_federation = Arc::new(SearchService::new(
        source_registry.clone(),
        adapters,
        config.search.search_config(),
    ));

    let status_aggregator = Arc::new(StatusService::new(
        source_registry.clone(),
        build_orchestrator.clone(),
        store,
        config.indexing.status_defaults(),
    ));

    let defaults = RequestDefaults {
        top_k: config.search.default_top_k,
        complexity: config.search.default_complexity,
        build: BuildDefaults {
            embedding_model: config.indexing.default_embedding_model.clone(),
            backend: config.indexing.default_backend.as_str().to_string(),
        },
    };

    info!(
        max_concurrent_builds = config.indexing.max_concurrent_builds,
        adapter_timeout_ms = config.search.adapter_timeout_ms,
        "Services initialized"
    );

    Ok(AppState {
        source_registry,
        build_orchestrator,
        search_federation,
        status_aggregator,
        defaults: Arc::new(defaults),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::EmbeddingModelSpec;

    #[test]
    fn test_create_app_state_with_defaults() {
        let state = create_app_state(&AppConfig::default()).unwrap();

        assert_eq!(state.defaults.top_k, 10);
        assert_eq!(state.defaults.build.backend, "hnsw");
    }

    #[test]
    fn test_default_model_must_be_in_catalog() {
        let mut config = AppConfig::default();
        config.indexing.embedding_models = vec![EmbeddingModelSpec::new("m1", 8)];

        let err = create_app_state(&config).unwrap_err();
        assert!(err.to_string().contains("is not in indexing.embedding_models"));

        config.indexing.embedding_models.clear();
        assert!(create_app_state(&config).is_err());
    }
}
