//! Review lifecycle and usefulness voting.
//!
//! Every review carries a `useful` score that is exactly its like votes
//! minus its dislike votes. The store keeps the per-user vote edges; this
//! module decides which transitions are legal and what lands in the feed.

use crate::db::{EventType, FeedRepo, FilmRepo, Operation, Review, ReviewRepo, UserRepo, VoteKind};
use crate::engine::{feed, EngineResult};

pub async fn add_review<R>(repo: &R, review: &Review) -> EngineResult<Review>
where
    R: ReviewRepo + UserRepo + FilmRepo + FeedRepo + ?Sized,
{
    repo.get_user(review.user_id).await?;
    repo.get_film(review.film_id).await?;
    let created = repo.create_review(review).await?;
    feed::record(
        repo,
        created.user_id,
        EventType::Review,
        Operation::Add,
        created.review_id,
    )
    .await?;
    Ok(created)
}

/// Updates content and verdict only. The feed event is attributed to the
/// review's original author, not whoever sent the update.
pub async fn update_review<R>(repo: &R, review: &Review) -> EngineResult<Review>
where
    R: ReviewRepo + FeedRepo + ?Sized,
{
    let updated = repo.update_review(review).await?;
    feed::record(
        repo,
        updated.user_id,
        EventType::Review,
        Operation::Update,
        updated.review_id,
    )
    .await?;
    Ok(updated)
}

pub async fn delete_review<R>(repo: &R, review_id: i64) -> EngineResult<()>
where
    R: ReviewRepo + FeedRepo + ?Sized,
{
    let review = repo.get_review(review_id).await?;
    repo.delete_review(review_id).await?;
    feed::record(
        repo,
        review.user_id,
        EventType::Review,
        Operation::Remove,
        review.review_id,
    )
    .await
}

pub async fn get_review<R>(repo: &R, review_id: i64) -> EngineResult<Review>
where
    R: ReviewRepo + ?Sized,
{
    Ok(repo.get_review(review_id).await?)
}

/// Most useful reviews first, for one film or across the catalog.
pub async fn get_reviews<R>(repo: &R, film_id: Option<i64>, count: i64) -> EngineResult<Vec<Review>>
where
    R: ReviewRepo + FilmRepo + ?Sized,
{
    match film_id {
        Some(id) => {
            repo.get_film(id).await?;
            Ok(repo.film_reviews(id, count).await?)
        }
        None => Ok(repo.list_reviews(count).await?),
    }
}

pub async fn add_vote<R>(
    repo: &R,
    review_id: i64,
    user_id: i64,
    vote: VoteKind,
) -> EngineResult<()>
where
    R: ReviewRepo + UserRepo + ?Sized,
{
    repo.get_review(review_id).await?;
    repo.get_user(user_id).await?;
    Ok(repo.apply_vote(review_id, user_id, vote).await?)
}

/// Retracts a vote of the given polarity. A mismatching or missing vote
/// leaves the score untouched.
pub async fn remove_vote<R>(
    repo: &R,
    review_id: i64,
    user_id: i64,
    vote: VoteKind,
) -> EngineResult<()>
where
    R: ReviewRepo + UserRepo + ?Sized,
{
    repo.get_review(review_id).await?;
    repo.get_user(user_id).await?;
    Ok(repo.remove_vote(review_id, user_id, vote).await?)
}
