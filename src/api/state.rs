//! Application state for shared services

use std::sync::Arc;

use super::types::BuildDefaults;
use crate::infrastructure::services::{
    IndexBuildOrchestrator, SearchFederation, SourceRegistry, StatusAggregator,
};

/// Values filled in when a request omits them
#[derive(Debug, Clone)]
pub struct RequestDefaults {
    pub top_k: usize,
    pub complexity: usize,
    pub build: BuildDefaults,
}

/// Application state containing shared services using dynamic dispatch
#[derive(Clone, Debug)]
pub struct AppState {
    pub source_registry: Arc<dyn SourceRegistry>,
    pub build_orchestrator: Arc<dyn IndexBuildOrchestrator>,
    pub search_federation: Arc<dyn SearchFederation>,
    pub status_aggregator: Arc<dyn StatusAggregator>,
    pub defaults: Arc<RequestDefaults>,
}
