use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::db::{Review, VoteKind};
use crate::engine::reviews;
use crate::error::ApiResult;
use crate::server::AppState;

pub async fn create_review(
    State(state): State<AppState>,
    Json(review): Json<Review>,
) -> ApiResult<Json<Review>> {
    if review.content.trim().is_empty() {
        return Err(crate::error::ApiError::InvalidInput(
            "Review content must not be blank".to_string(),
        ));
    }
    Ok(Json(reviews::add_review(state.db.as_ref(), &review).await?))
}

pub async fn update_review(
    State(state): State<AppState>,
    Json(review): Json<Review>,
) -> ApiResult<Json<Review>> {
    Ok(Json(
        reviews::update_review(state.db.as_ref(), &review).await?,
    ))
}

pub async fn delete_review(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    Ok(reviews::delete_review(state.db.as_ref(), id).await?)
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Review>> {
    Ok(Json(reviews::get_review(state.db.as_ref(), id).await?))
}

fn default_count() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListParams {
    film_id: Option<i64>,
    #[serde(default = "default_count")]
    count: i64,
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Query(params): Query<ReviewListParams>,
) -> ApiResult<Json<Vec<Review>>> {
    Ok(Json(
        reviews::get_reviews(state.db.as_ref(), params.film_id, params.count).await?,
    ))
}

pub async fn add_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    Ok(reviews::add_vote(state.db.as_ref(), id, user_id, VoteKind::Like).await?)
}

pub async fn add_dislike(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    Ok(reviews::add_vote(state.db.as_ref(), id, user_id, VoteKind::Dislike).await?)
}

pub async fn remove_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    Ok(reviews::remove_vote(state.db.as_ref(), id, user_id, VoteKind::Like).await?)
}

pub async fn remove_dislike(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    Ok(reviews::remove_vote(state.db.as_ref(), id, user_id, VoteKind::Dislike).await?)
}
