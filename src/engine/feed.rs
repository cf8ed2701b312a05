use chrono::Utc;

use crate::db::{EventType, FeedEvent, FeedRepo, Operation, UserRepo};

use super::EngineResult;

/// Appends one activity event stamped with the current wall clock.
pub async fn record<R>(
    repo: &R,
    user_id: i64,
    event_type: EventType,
    operation: Operation,
    entity_id: i64,
) -> EngineResult<()>
where
    R: FeedRepo + ?Sized,
{
    let event = FeedEvent {
        event_id: 0,
        timestamp: Utc::now().timestamp_millis(),
        user_id,
        event_type,
        operation,
        entity_id,
    };
    repo.record_event(&event).await?;
    Ok(())
}

/// A user's activity history in append order.
pub async fn get_user_feed<R>(repo: &R, user_id: i64) -> EngineResult<Vec<FeedEvent>>
where
    R: FeedRepo + UserRepo + ?Sized,
{
    repo.get_user(user_id).await?;
    Ok(repo.user_feed(user_id).await?)
}
