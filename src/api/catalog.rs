use axum::{
    extract::{Path, State},
    Json,
};

use crate::db::{Director, DirectorRepo, Genre, GenreRepo, Mpa, MpaRepo};
use crate::error::ApiResult;
use crate::server::AppState;
use crate::validate::validate_director;

pub async fn list_genres(State(state): State<AppState>) -> ApiResult<Json<Vec<Genre>>> {
    Ok(Json(state.db.list_genres().await?))
}

pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Genre>> {
    Ok(Json(state.db.get_genre(id).await?))
}

pub async fn list_mpa(State(state): State<AppState>) -> ApiResult<Json<Vec<Mpa>>> {
    Ok(Json(state.db.list_mpa().await?))
}

pub async fn get_mpa(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Mpa>> {
    Ok(Json(state.db.get_mpa(id).await?))
}

pub async fn list_directors(State(state): State<AppState>) -> ApiResult<Json<Vec<Director>>> {
    Ok(Json(state.db.list_directors().await?))
}

pub async fn get_director(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Director>> {
    Ok(Json(state.db.get_director(id).await?))
}

pub async fn create_director(
    State(state): State<AppState>,
    Json(director): Json<Director>,
) -> ApiResult<Json<Director>> {
    validate_director(&director)?;
    Ok(Json(state.db.create_director(&director).await?))
}

pub async fn update_director(
    State(state): State<AppState>,
    Json(director): Json<Director>,
) -> ApiResult<Json<Director>> {
    validate_director(&director)?;
    Ok(Json(state.db.update_director(&director).await?))
}

pub async fn delete_director(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.db.get_director(id).await?;
    Ok(state.db.delete_director(id).await?)
}
