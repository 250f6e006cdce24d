//! Data source registry endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::{
    AddDocumentsApiRequest, AddDocumentsResponse, ApiError, EditSourceApiRequest, Json,
    ListSourcesParams, ListSourcesResponse, RegisterSourceApiRequest, SourceResponse,
};
use crate::domain::source::SourceId;
use crate::infrastructure::services::RegisterSourceRequest;

pub(crate) fn parse_source_id(raw: &str) -> Result<SourceId, ApiError> {
    SourceId::new(raw).map_err(|e| ApiError::bad_request(e.to_string()).with_param("id"))
}

/// GET /sources
pub async fn list_sources(
    State(state): State<AppState>,
    Query(params): Query<ListSourcesParams>,
) -> Result<Json<ListSourcesResponse>, ApiError> {
    let filter = params.into_filter()?;
    let sources = state.source_registry.list(&filter).await?;

    let sources: Vec<SourceResponse> = sources.iter().map(SourceResponse::from).collect();
    let total = sources.len();

    Ok(Json(ListSourcesResponse { sources, total }))
}

/// POST /sources
pub async fn register_source(
    State(state): State<AppState>,
    Json(request): Json<RegisterSourceApiRequest>,
) -> Result<(StatusCode, Json<SourceResponse>), ApiError> {
    let request = RegisterSourceRequest::try_from(request)?;
    info!(name = %request.name, source_type = %request.source_type, "Registering data source");

    let source = state.source_registry.register(request).await?;

    Ok((StatusCode::CREATED, Json(SourceResponse::from(&source))))
}

/// GET /sources/{source_id}
pub async fn get_source(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> Result<Json<SourceResponse>, ApiError> {
    let id = parse_source_id(&source_id)?;
    let source = state.source_registry.get(&id).await?;

    Ok(Json(SourceResponse::from(&source)))
}

/// PUT /sources/{source_id}
pub async fn edit_source(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
    Json(request): Json<EditSourceApiRequest>,
) -> Result<Json<SourceResponse>, ApiError> {
    let id = parse_source_id(&source_id)?;
    debug!(source_id = %id, expected_version = request.expected_version, "Editing data source");

    let expected_version = request.expected_version;
    let source = state
        .source_registry
        .edit(&id, expected_version, request.into())
        .await?;

    Ok(Json(SourceResponse::from(&source)))
}

/// DELETE /sources/{source_id}
pub async fn deregister_source(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_source_id(&source_id)?;
    state.source_registry.deregister(&id).await?;

    Ok(Json(serde_json::json!({
        "deleted": true,
        "id": id.as_str()
    })))
}

/// POST /sources/{source_id}/documents
pub async fn add_documents(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
    Json(request): Json<AddDocumentsApiRequest>,
) -> Result<Json<AddDocumentsResponse>, ApiError> {
    let id = parse_source_id(&source_id)?;
    let accepted = request.documents.len();

    let document_count = state
        .source_registry
        .add_documents(&id, request.documents)
        .await?;

    Ok(Json(AddDocumentsResponse {
        source_id: id.to_string(),
        accepted,
        document_count,
    }))
}
