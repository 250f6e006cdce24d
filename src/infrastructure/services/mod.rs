//! Infrastructure services

mod index_build_service;
mod search_service;
mod source_service;
mod status_service;

pub use index_build_service::{
    IndexBuildConfig, IndexBuildOrchestrator, IndexBuildService, IndexRecord,
};
pub use search_service::{SearchConfig, SearchFederation, SearchService};
pub use source_service::{
    EditSourceRequest, RegisterSourceRequest, SourceFilter, SourceRegistry, SourceService,
    StatusFields,
};
pub use status_service::{StatusAggregator, StatusDefaults, StatusService};
