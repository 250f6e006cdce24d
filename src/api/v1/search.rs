//! Federated search endpoint

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, SearchApiRequest, SearchApiResponse};

/// POST /search
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchApiRequest>,
) -> Result<Json<SearchApiResponse>, ApiError> {
    let query = request.into_query(state.defaults.top_k, state.defaults.complexity);
    debug!(top_k = query.top_k, sources = ?query.sources, "Search request");

    let response = state.search_federation.search(query).await?;

    Ok(Json(SearchApiResponse::from(response)))
}
