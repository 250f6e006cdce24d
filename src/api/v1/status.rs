//! System status endpoint

use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::status::SystemStatus;

/// GET /status
pub async fn get_status(State(state): State<AppState>) -> Result<Json<SystemStatus>, ApiError> {
    let status = state.status_aggregator.get_status().await?;
    Ok(Json(status))
}
