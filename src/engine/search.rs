use std::cmp::Reverse;
use std::collections::HashMap;

use crate::db::{Film, FilmRepo};

use super::{EngineError, EngineResult};

/// Which fields a search query runs against, parsed from the request's
/// comma-separated `by` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBy {
    Title,
    Director,
    TitleOrDirector,
}

impl SearchBy {
    pub fn parse(by: &str) -> EngineResult<Self> {
        let fields: Vec<&str> = by.split(',').map(|s| s.trim()).collect();
        match fields.as_slice() {
            ["title"] => Ok(SearchBy::Title),
            ["director"] => Ok(SearchBy::Director),
            ["title", "director"] | ["director", "title"] => Ok(SearchBy::TitleOrDirector),
            _ => Err(EngineError::InvalidArgument(format!("unsupported search fields: {}", by))),
        }
    }
}

/// Case-insensitive substring search over film titles and/or director names.
pub async fn search<R>(repo: &R, query: &str, by: SearchBy) -> EngineResult<Vec<Film>>
where
    R: FilmRepo + ?Sized,
{
    let films = repo.list_films().await?;
    let likes = repo.like_counts().await?;
    Ok(search_films(films, &likes, query, by))
}

pub fn search_films(
    films: Vec<Film>,
    likes: &HashMap<i64, i64>,
    query: &str,
    by: SearchBy,
) -> Vec<Film> {
    let needle = query.to_lowercase();
    let title_match = |f: &Film| f.name.to_lowercase().contains(&needle);
    let director_match =
        |f: &Film| f.directors.iter().any(|d| d.name.to_lowercase().contains(&needle));

    let mut found: Vec<Film> = films
        .into_iter()
        .filter(|f| match by {
            SearchBy::Title => title_match(f),
            SearchBy::Director => director_match(f),
            SearchBy::TitleOrDirector => title_match(f) || director_match(f),
        })
        .collect();

    match by {
        // Single-field results keep catalog order; the combined search ranks
        // by popularity, ties on ascending id.
        SearchBy::Title | SearchBy::Director => found.sort_by_key(|f| f.id),
        SearchBy::TitleOrDirector => {
            found.sort_by_key(|f| (Reverse(likes.get(&f.id).copied().unwrap_or(0)), f.id))
        }
    }
    found
}
