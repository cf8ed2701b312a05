use std::collections::HashMap;

use async_trait::async_trait;

use super::model::*;

#[async_trait]
pub trait FilmRepo: Send + Sync {
    async fn create_film(&self, film: &Film) -> DbResult<Film>;
    /// Full update including replacement of the genre and director link sets,
    /// applied in one transaction. NotFound when the id is unknown.
    async fn update_film(&self, film: &Film) -> DbResult<Film>;
    async fn list_films(&self) -> DbResult<Vec<Film>>;
    async fn get_film(&self, id: i64) -> DbResult<Film>;
    async fn delete_film(&self, id: i64) -> DbResult<()>;
    async fn films_by_ids(&self, ids: &[i64]) -> DbResult<Vec<Film>>;
    async fn films_by_director(&self, director_id: i64) -> DbResult<Vec<Film>>;

    /// Idempotent: inserting an existing edge is a no-op.
    async fn put_like(&self, film_id: i64, user_id: i64) -> DbResult<()>;
    /// Idempotent: deleting a missing edge is a no-op.
    async fn delete_like(&self, film_id: i64, user_id: i64) -> DbResult<()>;
    /// Distinct-user like count per film. Films with no likes are absent.
    async fn like_counts(&self) -> DbResult<HashMap<i64, i64>>;
    async fn liked_film_ids(&self, user_id: i64) -> DbResult<Vec<i64>>;
    async fn like_edges(&self) -> DbResult<Vec<LikeEdge>>;
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, user: &User) -> DbResult<User>;
    async fn update_user(&self, user: &User) -> DbResult<User>;
    async fn list_users(&self) -> DbResult<Vec<User>>;
    async fn get_user(&self, id: i64) -> DbResult<User>;
    async fn delete_user(&self, id: i64) -> DbResult<()>;
    async fn users_by_ids(&self, ids: &[i64]) -> DbResult<Vec<User>>;

    async fn add_friend(&self, user_id: i64, friend_id: i64) -> DbResult<()>;
    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> DbResult<()>;
    /// Outgoing friend edges in insertion order.
    async fn friend_ids(&self, user_id: i64) -> DbResult<Vec<i64>>;
}

#[async_trait]
pub trait DirectorRepo: Send + Sync {
    async fn create_director(&self, director: &Director) -> DbResult<Director>;
    async fn update_director(&self, director: &Director) -> DbResult<Director>;
    async fn list_directors(&self) -> DbResult<Vec<Director>>;
    async fn get_director(&self, id: i64) -> DbResult<Director>;
    async fn delete_director(&self, id: i64) -> DbResult<()>;
}

#[async_trait]
pub trait GenreRepo: Send + Sync {
    async fn list_genres(&self) -> DbResult<Vec<Genre>>;
    async fn get_genre(&self, id: i64) -> DbResult<Genre>;
}

#[async_trait]
pub trait MpaRepo: Send + Sync {
    async fn list_mpa(&self) -> DbResult<Vec<Mpa>>;
    async fn get_mpa(&self, id: i64) -> DbResult<Mpa>;
}

#[async_trait]
pub trait ReviewRepo: Send + Sync {
    async fn create_review(&self, review: &Review) -> DbResult<Review>;
    /// Only content and sentiment are updatable; author and film are fixed.
    async fn update_review(&self, review: &Review) -> DbResult<Review>;
    async fn delete_review(&self, id: i64) -> DbResult<()>;
    async fn get_review(&self, id: i64) -> DbResult<Review>;
    async fn list_reviews(&self, count: i64) -> DbResult<Vec<Review>>;
    async fn film_reviews(&self, film_id: i64, count: i64) -> DbResult<Vec<Review>>;

    /// Records a vote edge and adjusts usefulness in one transaction.
    /// A repeated vote of the same kind is a no-op; an opposite vote replaces
    /// the existing one.
    async fn apply_vote(&self, review_id: i64, user_id: i64, vote: VoteKind) -> DbResult<()>;
    /// Removes a vote edge of the given kind and reverses its delta in one
    /// transaction. A missing edge is a no-op.
    async fn remove_vote(&self, review_id: i64, user_id: i64, vote: VoteKind) -> DbResult<()>;
}

#[async_trait]
pub trait FeedRepo: Send + Sync {
    async fn record_event(&self, event: &FeedEvent) -> DbResult<()>;
    /// Events for one user in append order.
    async fn user_feed(&self, user_id: i64) -> DbResult<Vec<FeedEvent>>;
}

pub trait CatalogRepo:
    FilmRepo + UserRepo + DirectorRepo + GenreRepo + MpaRepo + ReviewRepo + FeedRepo + Send + Sync
{
}

impl<T> CatalogRepo for T where
    T: FilmRepo + UserRepo + DirectorRepo + GenreRepo + MpaRepo + ReviewRepo + FeedRepo + Send + Sync
{
}
