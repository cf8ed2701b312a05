use axum::{
    extract::{Path, State},
    Json,
};

use crate::db::{FeedEvent, Film, User, UserRepo};
use crate::engine::{feed, recommend, social};
use crate::error::ApiResult;
use crate::server::AppState;
use crate::validate::validate_user;

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.db.list_users().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.db.get_user(id).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> ApiResult<Json<User>> {
    validate_user(&user)?;
    Ok(Json(state.db.create_user(&user).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> ApiResult<Json<User>> {
    validate_user(&user)?;
    Ok(Json(state.db.update_user(&user).await?))
}

pub async fn delete_user(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.db.get_user(id).await?;
    Ok(state.db.delete_user(id).await?)
}

pub async fn add_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    Ok(social::add_friend(state.db.as_ref(), id, friend_id).await?)
}

pub async fn remove_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    Ok(social::remove_friend(state.db.as_ref(), id, friend_id).await?)
}

pub async fn get_friends(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(social::get_friends(state.db.as_ref(), id).await?))
}

pub async fn common_friends(
    State(state): State<AppState>,
    Path((id, other_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(
        social::get_common_friends(state.db.as_ref(), id, other_id).await?,
    ))
}

pub async fn recommendations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Film>>> {
    Ok(Json(recommend::recommend(state.db.as_ref(), id).await?))
}

pub async fn feed(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<FeedEvent>>> {
    Ok(Json(feed::get_user_feed(state.db.as_ref(), id).await?))
}
