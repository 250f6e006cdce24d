//! Index build request and response bodies

use serde::{Deserialize, Serialize};

use super::source::SourceResponse;
use crate::domain::index_build::{BuildRequest, BuildStage, IndexBuildJob};
use crate::infrastructure::services::IndexRecord;

/// Defaults applied to build requests that omit model or backend
#[derive(Debug, Clone)]
pub struct BuildDefaults {
    pub embedding_model: String,
    pub backend: String,
}

/// Body of `POST /sources/{id}/build`; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceBuildApiRequest {
    /// Index name; defaults to the source id
    pub name: Option<String>,
    #[serde(alias = "embeddingModel")]
    pub embedding_model: Option<String>,
    pub backend: Option<String>,
    #[serde(alias = "chunkSize")]
    pub chunk_size: Option<usize>,
    #[serde(alias = "chunkOverlap")]
    pub chunk_overlap: Option<usize>,
    /// Further sources built into the same index
    #[serde(default, alias = "additionalSources")]
    pub additional_sources: Vec<String>,
}

impl SourceBuildApiRequest {
    pub fn into_build_request(self, source_id: &str, defaults: &BuildDefaults) -> BuildRequest {
        let mut source_ids = vec![source_id.to_string()];
        source_ids.extend(
            self.additional_sources
                .into_iter()
                .filter(|id| id != source_id),
        );

        let name = self.name.unwrap_or_else(|| source_id.to_string());
        let request = BuildRequest::new(name, source_ids);
        let chunk_size = self.chunk_size.unwrap_or(request.chunk_size);
        let chunk_overlap = self.chunk_overlap.unwrap_or(request.chunk_overlap);

        request
            .with_embedding_model(
                self.embedding_model
                    .unwrap_or_else(|| defaults.embedding_model.clone()),
            )
            .with_backend(self.backend.unwrap_or_else(|| defaults.backend.clone()))
            .with_chunking(chunk_size, chunk_overlap)
    }
}

/// Body of `POST /indices`, as sent by the index creation wizard
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexApiRequest {
    pub name: String,
    #[serde(alias = "data_sources")]
    pub data_sources: Vec<String>,
    #[serde(alias = "embedding_model")]
    pub embedding_model: Option<String>,
    pub backend: Option<String>,
    #[serde(alias = "chunk_size")]
    pub chunk_size: Option<usize>,
    #[serde(alias = "chunk_overlap")]
    pub chunk_overlap: Option<usize>,
}

impl CreateIndexApiRequest {
    pub fn into_build_request(self, defaults: &BuildDefaults) -> BuildRequest {
        let request = BuildRequest::new(self.name, self.data_sources);
        let chunk_size = self.chunk_size.unwrap_or(request.chunk_size);
        let chunk_overlap = self.chunk_overlap.unwrap_or(request.chunk_overlap);

        request
            .with_embedding_model(
                self.embedding_model
                    .unwrap_or_else(|| defaults.embedding_model.clone()),
            )
            .with_backend(self.backend.unwrap_or_else(|| defaults.backend.clone()))
            .with_chunking(chunk_size, chunk_overlap)
    }
}

/// Coarse job state used by polling clients
fn phase(stage: BuildStage) -> &'static str {
    match stage {
        BuildStage::Completed => "completed",
        BuildStage::Error => "error",
        BuildStage::Cancelled => "cancelled",
        _ => "processing",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobResponse {
    pub id: String,
    pub name: String,
    pub source_ids: Vec<String>,
    pub embedding_model: String,
    pub backend: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub stage: BuildStage,
    pub status: &'static str,
    pub progress_percent: f64,
    pub current_step: String,
    pub total_steps: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub cancel_requested: bool,
    pub document_count: u64,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl From<&IndexBuildJob> for JobResponse {
    fn from(job: &IndexBuildJob) -> Self {
        let spec = job.spec();

        Self {
            id: job.id().to_string(),
            name: spec.name.clone(),
            source_ids: spec.source_ids.iter().map(|id| id.to_string()).collect(),
            embedding_model: spec.embedding_model.id.clone(),
            backend: spec.backend.as_str().to_string(),
            chunk_size: spec.chunking.chunk_size,
            chunk_overlap: spec.chunking.chunk_overlap,
            stage: job.stage(),
            status: phase(job.stage()),
            progress_percent: job.progress_percent(),
            current_step: job.current_step().to_string(),
            total_steps: job.total_steps(),
            error_message: job.error_message().map(str::to_string),
            cancel_requested: job.cancel_requested(),
            document_count: job.document_count(),
            created_at: job.created_at().to_rfc3339(),
            started_at: job.started_at().map(|t| t.to_rfc3339()),
            completed_at: job.completed_at().map(|t| t.to_rfc3339()),
        }
    }
}

/// Returned with HTTP 202 when a build is accepted
#[derive(Debug, Clone, Serialize)]
pub struct BuildAcceptedResponse {
    pub message: &'static str,
    pub job_id: String,
    /// Same as `job_id`; kept for wizard clients polling by progress id
    pub progress_id: String,
    pub job: JobResponse,
}

impl From<&IndexBuildJob> for BuildAcceptedResponse {
    fn from(job: &IndexBuildJob) -> Self {
        Self {
            message: "Index creation started",
            job_id: job.id().to_string(),
            progress_id: job.id().to_string(),
            job: JobResponse::from(job),
        }
    }
}

/// Progress snapshot in the wizard's polling format
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationProgressResponse {
    pub status: &'static str,
    pub progress: u8,
    pub current_step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&IndexBuildJob> for CreationProgressResponse {
    fn from(job: &IndexBuildJob) -> Self {
        let message = match job.stage() {
            BuildStage::Completed => Some(format!(
                "Indexed {} chunks into '{}'",
                job.document_count(),
                job.spec().name
            )),
            _ => None,
        };

        Self {
            status: phase(job.stage()),
            progress: job.progress_percent().clamp(0.0, 100.0).floor() as u8,
            current_step: job.current_step().to_string(),
            message,
            error: job.error_message().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<JobResponse>,
    pub total: usize,
}

/// Body of `GET /indices`
#[derive(Debug, Clone, Serialize)]
pub struct IndicesResponse {
    pub indices: Vec<IndexRecord>,
    pub sources: Vec<SourceResponse>,
}
