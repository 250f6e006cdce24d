//! Search, status, source and build endpoints
//!
//! The same router is mounted under `/api` and `/v1`.

pub mod builds;
pub mod search;
pub mod sources;
pub mod status;

use axum::{
    Router,
    routing::{get, post},
};

use super::state::AppState;

/// Create the service API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/search", post(search::search))
        .route("/status", get(status::get_status))
        .route(
            "/indices",
            get(builds::list_indices).post(builds::create_index),
        )
        .route("/indices/create", post(builds::create_index))
        .route(
            "/indices/create/{job_id}/progress",
            get(builds::get_creation_progress),
        )
        .route(
            "/sources",
            get(sources::list_sources).post(sources::register_source),
        )
        .route(
            "/sources/{source_id}",
            get(sources::get_source)
                .put(sources::edit_source)
                .delete(sources::deregister_source),
        )
        .route("/sources/{source_id}/documents", post(sources::add_documents))
        .route("/sources/{source_id}/build", post(builds::submit_source_build))
        .route(
            "/sources/{source_id}/build/{job_id}",
            get(builds::get_source_build).delete(builds::cancel_source_build),
        )
        .route("/builds", get(builds::list_builds))
        .route(
            "/builds/{job_id}",
            get(builds::get_build).delete(builds::purge_build),
        )
}
