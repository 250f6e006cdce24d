//! Index build job domain

mod builder;
mod entity;
pub mod repository;
mod request;

pub use builder::{
    IndexBuilder, ProcessedChunk, ProcessedCorpus, ProcessedSource, ProgressSink, StagedIndex,
};
pub use entity::{BuildStage, BuildTarget, IndexBuildJob, JobId, TOTAL_STAGES};
pub use repository::{IndexJobRepository, JobMutation};
pub use request::{BackendKind, BuildRequest, BuildSpec, MAX_INDEX_NAME_LENGTH};
