//! Friendship edges, like edges, and the queries over their intersections.
//!
//! Friendship is directed: `add_friend(a, b)` makes `b` visible in `a`'s
//! friend list only. All edge writes land in the activity feed.

use std::cmp::Reverse;

use crate::db::{EventType, FeedRepo, Film, FilmRepo, Operation, User, UserRepo};
use crate::engine::{feed, order_by_ids, EngineError, EngineResult};

/// Adds a directed friendship edge and records a FRIEND/ADD event.
/// Re-adding an existing edge is a no-op for the edge but still logged.
pub async fn add_friend<R>(repo: &R, user_id: i64, friend_id: i64) -> EngineResult<()>
where
    R: UserRepo + FeedRepo + ?Sized,
{
    if user_id == friend_id {
        return Err(EngineError::InvalidArgument(format!(
            "User {} cannot befriend themselves",
            user_id
        )));
    }
    repo.add_friend(user_id, friend_id).await?;
    feed::record(repo, user_id, EventType::Friend, Operation::Add, friend_id).await
}

pub async fn remove_friend<R>(repo: &R, user_id: i64, friend_id: i64) -> EngineResult<()>
where
    R: UserRepo + FeedRepo + ?Sized,
{
    if user_id == friend_id {
        return Err(EngineError::InvalidArgument(format!(
            "User {} cannot unfriend themselves",
            user_id
        )));
    }
    repo.get_user(user_id).await?;
    repo.get_user(friend_id).await?;
    repo.remove_friend(user_id, friend_id).await?;
    feed::record(repo, user_id, EventType::Friend, Operation::Remove, friend_id).await
}

/// Outgoing friends of a user, in the order the edges were added.
pub async fn get_friends<R>(repo: &R, user_id: i64) -> EngineResult<Vec<User>>
where
    R: UserRepo + ?Sized,
{
    repo.get_user(user_id).await?;
    let ids = repo.friend_ids(user_id).await?;
    let users = repo.users_by_ids(&ids).await?;
    Ok(order_by_ids(users, &ids, |u| u.id))
}

/// Friends both users point at, ordered by the first user's edge order.
pub async fn get_common_friends<R>(repo: &R, user_id: i64, other_id: i64) -> EngineResult<Vec<User>>
where
    R: UserRepo + ?Sized,
{
    if user_id == other_id {
        return Err(EngineError::InvalidArgument(format!(
            "Cannot intersect friends of user {} with themselves",
            user_id
        )));
    }
    repo.get_user(user_id).await?;
    repo.get_user(other_id).await?;
    let ours = repo.friend_ids(user_id).await?;
    let theirs = repo.friend_ids(other_id).await?;
    let common: Vec<i64> = ours.into_iter().filter(|id| theirs.contains(id)).collect();
    let users = repo.users_by_ids(&common).await?;
    Ok(order_by_ids(users, &common, |u| u.id))
}

/// Films both users liked, most liked overall first.
pub async fn get_common_films<R>(repo: &R, user_id: i64, friend_id: i64) -> EngineResult<Vec<Film>>
where
    R: FilmRepo + UserRepo + ?Sized,
{
    repo.get_user(user_id).await?;
    repo.get_user(friend_id).await?;
    let ours = repo.liked_film_ids(user_id).await?;
    let theirs = repo.liked_film_ids(friend_id).await?;
    let common: Vec<i64> = ours.into_iter().filter(|id| theirs.contains(id)).collect();
    let likes = repo.like_counts().await?;
    let mut films = repo.films_by_ids(&common).await?;
    films.sort_by_key(|f| (Reverse(likes.get(&f.id).copied().unwrap_or(0)), f.id));
    Ok(films)
}

/// Adds a like edge and records a LIKE/ADD event. Liking twice keeps a
/// single edge but still logs the event.
pub async fn put_like<R>(repo: &R, film_id: i64, user_id: i64) -> EngineResult<()>
where
    R: FilmRepo + FeedRepo + ?Sized,
{
    repo.put_like(film_id, user_id).await?;
    feed::record(repo, user_id, EventType::Like, Operation::Add, film_id).await
}

pub async fn delete_like<R>(repo: &R, film_id: i64, user_id: i64) -> EngineResult<()>
where
    R: FilmRepo + UserRepo + FeedRepo + ?Sized,
{
    repo.get_film(film_id).await?;
    repo.get_user(user_id).await?;
    repo.delete_like(film_id, user_id).await?;
    feed::record(repo, user_id, EventType::Like, Operation::Remove, film_id).await
}
