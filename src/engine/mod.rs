//! Discovery & ranking engine: the aggregation and graph queries over the
//! catalog store. Each operation is an explicit filter → group-count → sort
//! pipeline over fetched rows; the store only supplies primitives.

pub mod feed;
pub mod ranking;
pub mod recommend;
pub mod reviews;
pub mod search;
pub mod social;

#[cfg(test)]
pub(crate) mod testutil;

use std::collections::HashMap;

use crate::db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Db(DbError),
}

impl From<DbError> for EngineError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(msg) => EngineError::NotFound(msg),
            // The store rejecting a write over a missing referenced row is a
            // NotFound to the caller, not a storage failure.
            DbError::ForeignKey(what) => EngineError::NotFound(format!("Not found: {}", what)),
            other => EngineError::Db(other),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Reorders fetched records to follow a previously computed id sequence.
/// Ids without a matching record are dropped.
pub(crate) fn order_by_ids<T>(items: Vec<T>, ids: &[i64], id_of: impl Fn(&T) -> i64) -> Vec<T> {
    let mut by_id: HashMap<i64, T> = items.into_iter().map(|t| (id_of(&t), t)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
