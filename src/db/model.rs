use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mpa {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Director {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    pub duration: i32,
    #[serde(default)]
    pub mpa: Option<Mpa>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub directors: Vec<Director>,
}

impl Film {
    /// Adds a genre, keeping insertion order and dropping duplicate ids.
    pub fn add_genre(&mut self, genre: Genre) {
        if !self.genres.iter().any(|g| g.id == genre.id) {
            self.genres.push(genre);
        }
    }

    pub fn add_director(&mut self, director: Director) {
        if !self.directors.iter().any(|d| d.id == director.id) {
            self.directors.push(director);
        }
    }

    pub fn has_genre(&self, genre_id: i64) -> bool {
        self.genres.iter().any(|g| g.id == genre_id)
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|d| d.year())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: i64,
    pub email: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

impl User {
    /// Display name falls back to the login when the name is blank or absent.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.login,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default)]
    pub review_id: i64,
    pub content: String,
    pub is_positive: bool,
    pub user_id: i64,
    pub film_id: i64,
    #[serde(default)]
    pub useful: i64,
}

/// A single (film, user) like membership fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct LikeEdge {
    pub film_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Like,
    Friend,
    Review,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Like => "LIKE",
            EventType::Friend => "FRIEND",
            EventType::Review => "REVIEW",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LIKE" => Some(EventType::Like),
            "FRIEND" => Some(EventType::Friend),
            "REVIEW" => Some(EventType::Review),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "ADD",
            Operation::Remove => "REMOVE",
            Operation::Update => "UPDATE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADD" => Some(Operation::Add),
            "REMOVE" => Some(Operation::Remove),
            "UPDATE" => Some(Operation::Update),
            _ => None,
        }
    }
}

/// Append-only activity record. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEvent {
    #[serde(default)]
    pub event_id: i64,
    pub timestamp: i64,
    pub user_id: i64,
    pub event_type: EventType,
    pub operation: Operation,
    pub entity_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteKind {
    Like,
    Dislike,
}

impl VoteKind {
    pub fn is_like(&self) -> bool {
        matches!(self, VoteKind::Like)
    }

    pub fn from_is_like(is_like: bool) -> Self {
        if is_like {
            VoteKind::Like
        } else {
            VoteKind::Dislike
        }
    }

    /// Contribution of an active vote of this kind to a review's usefulness.
    pub fn delta(&self) -> i64 {
        match self {
            VoteKind::Like => 1,
            VoteKind::Dislike => -1,
        }
    }
}

/// Usefulness swing caused by casting a vote, given the voter's currently
/// active vote on the same review.
///
/// A repeated vote of the same kind is a no-op (None). A vote of the opposite
/// kind replaces the old one, so the swing is twice the single delta.
pub fn vote_transition(existing: Option<VoteKind>, new: VoteKind) -> Option<i64> {
    match existing {
        None => Some(new.delta()),
        Some(old) if old == new => None,
        Some(old) => Some(new.delta() - old.delta()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Referential integrity violation: {0}")]
    ForeignKey(String),
}

pub type DbResult<T> = Result<T, DbError>;
