//! Rating submission and statistics endpoints

use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::infrastructure::{Granularity, NewRating, RatingStats};

#[derive(Debug, Serialize)]
pub struct SubmitRatingResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(default = "default_granularity")]
    pub granularity: Granularity,
}

fn default_granularity() -> Granularity {
    Granularity::Day
}

/// POST /v1/ratings
pub async fn submit_rating(
    State(state): State<AppState>,
    Json(rating): Json<NewRating>,
) -> Result<(StatusCode, Json<SubmitRatingResponse>), ApiError> {
    let id = state.ratings.submit(rating).await.map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(SubmitRatingResponse { id })))
}

/// GET /v1/ratings/stats
pub async fn rating_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<RatingStats>, ApiError> {
    let stats = state
        .ratings
        .stats(query.granularity)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(stats))
}
