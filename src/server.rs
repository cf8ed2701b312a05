use axum::{
    http::StatusCode,
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api;
use crate::db::SqliteRepository;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqliteRepository>,
}

impl AppState {
    pub fn new(db: Arc<SqliteRepository>) -> Self {
        Self { db }
    }
}

pub fn build_router(state: AppState) -> Router {
    let film_routes = Router::new()
        .route("/films", get(api::films::list_films).post(api::films::create_film).put(api::films::update_film))
        .route("/films/popular", get(api::films::popular))
        .route("/films/search", get(api::films::search))
        .route("/films/common", get(api::films::common_films))
        .route("/films/director/:director_id", get(api::films::by_director))
        .route("/films/:id", get(api::films::get_film).delete(api::films::delete_film))
        .route(
            "/films/:id/like/:user_id",
            put(api::films::put_like).delete(api::films::delete_like),
        );

    let user_routes = Router::new()
        .route("/users", get(api::users::list_users).post(api::users::create_user).put(api::users::update_user))
        .route("/users/:id", get(api::users::get_user).delete(api::users::delete_user))
        .route(
            "/users/:id/friends/:friend_id",
            put(api::users::add_friend).delete(api::users::remove_friend),
        )
        .route("/users/:id/friends", get(api::users::get_friends))
        .route(
            "/users/:id/friends/common/:other_id",
            get(api::users::common_friends),
        )
        .route("/users/:id/recommendations", get(api::users::recommendations))
        .route("/users/:id/feed", get(api::users::feed));

    let review_routes = Router::new()
        .route(
            "/reviews",
            get(api::reviews::list_reviews)
                .post(api::reviews::create_review)
                .put(api::reviews::update_review),
        )
        .route(
            "/reviews/:id",
            get(api::reviews::get_review).delete(api::reviews::delete_review),
        )
        .route(
            "/reviews/:id/like/:user_id",
            put(api::reviews::add_like).delete(api::reviews::remove_like),
        )
        .route(
            "/reviews/:id/dislike/:user_id",
            put(api::reviews::add_dislike).delete(api::reviews::remove_dislike),
        );

    let catalog_routes = Router::new()
        .route("/genres", get(api::catalog::list_genres))
        .route("/genres/:id", get(api::catalog::get_genre))
        .route("/mpa", get(api::catalog::list_mpa))
        .route("/mpa/:id", get(api::catalog::get_mpa))
        .route(
            "/directors",
            get(api::catalog::list_directors)
                .post(api::catalog::create_director)
                .put(api::catalog::update_director),
        )
        .route(
            "/directors/:id",
            get(api::catalog::get_director).delete(api::catalog::delete_director),
        );

    Router::new()
        .merge(film_routes)
        .merge(user_routes)
        .merge(review_routes)
        .merge(catalog_routes)
        .fallback(fallback_handler)
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}
