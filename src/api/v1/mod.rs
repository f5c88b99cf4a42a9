//! v1 API endpoints

pub mod batch;
pub mod models;
pub mod ratings;
pub mod translate;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Batch uploads may carry whole documents
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/translate", post(translate::translate))
        .route("/models", get(models::list_models))
        .route("/models/groups", get(models::list_model_groups))
        .route(
            "/batch",
            post(batch::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/batch/progress", get(batch::progress))
        .route("/ratings", post(ratings::submit_rating))
        .route("/ratings/stats", get(ratings::rating_stats))
}
