//! Index build endpoints

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;

use super::sources::parse_source_id;
use crate::api::state::AppState;
use crate::api::types::{
    ApiError, BuildAcceptedResponse, CreateIndexApiRequest, CreationProgressResponse,
    IndicesResponse, JobResponse, Json, ListJobsResponse, SourceBuildApiRequest, SourceResponse,
};
use crate::domain::index_build::{IndexBuildJob, JobId};
use crate::domain::source::SourceId;
use crate::infrastructure::services::SourceFilter;

fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    JobId::new(raw).map_err(|e| ApiError::from(e).with_param("job_id"))
}

/// Load a job and check that it targets `source_id`
async fn job_for_source(
    state: &AppState,
    source_id: &SourceId,
    job_id: &JobId,
) -> Result<IndexBuildJob, ApiError> {
    let job = state.build_orchestrator.get_progress(job_id).await?;

    if !job.targets_source(source_id) {
        return Err(ApiError::not_found(format!(
            "Build job '{}' does not target data source '{}'",
            job_id, source_id
        )));
    }

    Ok(job)
}

/// POST /sources/{source_id}/build
pub async fn submit_source_build(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<BuildAcceptedResponse>), ApiError> {
    let id = parse_source_id(&source_id)?;
    // a missing source is NotFound here rather than a validation failure
    state.source_registry.get(&id).await?;

    let options: SourceBuildApiRequest = if body.is_empty() {
        SourceBuildApiRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?
    };
    let request = options.into_build_request(id.as_str(), &state.defaults.build);

    let job = state.build_orchestrator.submit(request).await?;
    info!(job_id = %job.id(), source_id = %id, "Build accepted");

    Ok((StatusCode::ACCEPTED, Json(BuildAcceptedResponse::from(&job))))
}

/// GET /sources/{source_id}/build/{job_id}
pub async fn get_source_build(
    State(state): State<AppState>,
    Path((source_id, job_id)): Path<(String, String)>,
) -> Result<Json<JobResponse>, ApiError> {
    let id = parse_source_id(&source_id)?;
    let job_id = parse_job_id(&job_id)?;
    let job = job_for_source(&state, &id, &job_id).await?;

    Ok(Json(JobResponse::from(&job)))
}

/// DELETE /sources/{source_id}/build/{job_id}
pub async fn cancel_source_build(
    State(state): State<AppState>,
    Path((source_id, job_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<JobResponse>), ApiError> {
    let id = parse_source_id(&source_id)?;
    let job_id = parse_job_id(&job_id)?;
    job_for_source(&state, &id, &job_id).await?;

    let job = state.build_orchestrator.cancel(&job_id).await?;
    info!(job_id = %job_id, "Cancellation requested");

    Ok((StatusCode::ACCEPTED, Json(JobResponse::from(&job))))
}

/// POST /indices and POST /indices/create
pub async fn create_index(
    State(state): State<AppState>,
    Json(request): Json<CreateIndexApiRequest>,
) -> Result<(StatusCode, Json<BuildAcceptedResponse>), ApiError> {
    let request = request.into_build_request(&state.defaults.build);
    let job = state.build_orchestrator.submit(request).await?;
    info!(job_id = %job.id(), name = %job.spec().name, "Index build accepted");

    Ok((StatusCode::ACCEPTED, Json(BuildAcceptedResponse::from(&job))))
}

/// GET /indices/create/{job_id}/progress
pub async fn get_creation_progress(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<CreationProgressResponse>, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    let job = state.build_orchestrator.get_progress(&job_id).await?;

    Ok(Json(CreationProgressResponse::from(&job)))
}

/// GET /indices
pub async fn list_indices(State(state): State<AppState>) -> Result<Json<IndicesResponse>, ApiError> {
    let indices = state.build_orchestrator.list_indices().await?;
    let sources = state
        .source_registry
        .list(&SourceFilter::default())
        .await?;

    Ok(Json(IndicesResponse {
        indices,
        sources: sources.iter().map(SourceResponse::from).collect(),
    }))
}

/// GET /builds
pub async fn list_builds(State(state): State<AppState>) -> Result<Json<ListJobsResponse>, ApiError> {
    let jobs: Vec<JobResponse> = state
        .build_orchestrator
        .list_jobs()
        .await?
        .iter()
        .map(JobResponse::from)
        .collect();
    let total = jobs.len();

    Ok(Json(ListJobsResponse { jobs, total }))
}

/// GET /builds/{job_id}
pub async fn get_build(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    let job = state.build_orchestrator.get_progress(&job_id).await?;

    Ok(Json(JobResponse::from(&job)))
}

/// DELETE /builds/{job_id}
pub async fn purge_build(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    state.build_orchestrator.purge(&job_id).await?;

    Ok(Json(serde_json::json!({
        "deleted": true,
        "id": job_id.as_str()
    })))
}
