use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::db::{Film, FilmRepo};
use crate::engine::{ranking, search as search_engine, social};
use crate::error::ApiResult;
use crate::server::AppState;
use crate::validate::validate_film;

pub async fn list_films(State(state): State<AppState>) -> ApiResult<Json<Vec<Film>>> {
    Ok(Json(state.db.list_films().await?))
}

pub async fn get_film(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Film>> {
    Ok(Json(state.db.get_film(id).await?))
}

pub async fn create_film(
    State(state): State<AppState>,
    Json(film): Json<Film>,
) -> ApiResult<Json<Film>> {
    validate_film(&film)?;
    Ok(Json(state.db.create_film(&film).await?))
}

pub async fn update_film(
    State(state): State<AppState>,
    Json(film): Json<Film>,
) -> ApiResult<Json<Film>> {
    validate_film(&film)?;
    Ok(Json(state.db.update_film(&film).await?))
}

pub async fn delete_film(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.db.get_film(id).await?;
    Ok(state.db.delete_film(id).await?)
}

fn default_count() -> usize {
    10
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularParams {
    #[serde(default = "default_count")]
    count: usize,
    genre_id: Option<i64>,
    year: Option<i32>,
}

pub async fn popular(
    State(state): State<AppState>,
    Query(params): Query<PopularParams>,
) -> ApiResult<Json<Vec<Film>>> {
    let films = ranking::get_popular(
        state.db.as_ref(),
        params.count,
        params.genre_id,
        params.year,
    )
    .await?;
    Ok(Json(films))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    query: String,
    by: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Film>>> {
    let by = match params.by.as_deref() {
        Some(by) => search_engine::SearchBy::parse(by)?,
        None => search_engine::SearchBy::TitleOrDirector,
    };
    let films = search_engine::search(state.db.as_ref(), &params.query, by).await?;
    Ok(Json(films))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonParams {
    user_id: i64,
    friend_id: i64,
}

pub async fn common_films(
    State(state): State<AppState>,
    Query(params): Query<CommonParams>,
) -> ApiResult<Json<Vec<Film>>> {
    let films =
        social::get_common_films(state.db.as_ref(), params.user_id, params.friend_id).await?;
    Ok(Json(films))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorSortParams {
    sort_by: Option<String>,
}

pub async fn by_director(
    State(state): State<AppState>,
    Path(director_id): Path<i64>,
    Query(params): Query<DirectorSortParams>,
) -> ApiResult<Json<Vec<Film>>> {
    let sort = match params.sort_by.as_deref() {
        Some(s) => ranking::DirectorSort::parse(s)?,
        None => ranking::DirectorSort::Year,
    };
    let films = ranking::films_by_director(state.db.as_ref(), director_id, sort).await?;
    Ok(Json(films))
}

pub async fn put_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    Ok(social::put_like(state.db.as_ref(), id, user_id).await?)
}

pub async fn delete_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    Ok(social::delete_like(state.db.as_ref(), id, user_id).await?)
}
