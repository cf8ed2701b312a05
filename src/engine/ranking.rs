use std::cmp::Reverse;
use std::collections::HashMap;

use crate::db::{DirectorRepo, Film, FilmRepo};

use super::{EngineError, EngineResult};

/// Films ordered by distinct-user like count, optionally restricted to one
/// genre and/or one release year.
pub async fn get_popular<R>(
    repo: &R,
    count: usize,
    genre_id: Option<i64>,
    year: Option<i32>,
) -> EngineResult<Vec<Film>>
where
    R: FilmRepo + ?Sized,
{
    if count < 1 {
        return Err(EngineError::InvalidArgument("count must be positive".to_string()));
    }
    let films = repo.list_films().await?;
    let likes = repo.like_counts().await?;
    Ok(rank_by_popularity(films, &likes, count, genre_id, year))
}

/// Filter → count → sort pipeline behind [`get_popular`]. Ties in like count
/// order by ascending film id so the ranking is deterministic.
pub fn rank_by_popularity(
    films: Vec<Film>,
    likes: &HashMap<i64, i64>,
    count: usize,
    genre_id: Option<i64>,
    year: Option<i32>,
) -> Vec<Film> {
    let mut ranked: Vec<Film> = films
        .into_iter()
        .filter(|f| genre_id.map_or(true, |g| f.has_genre(g)))
        .filter(|f| year.map_or(true, |y| f.release_year() == Some(y)))
        .collect();
    ranked.sort_by_key(|f| (Reverse(likes.get(&f.id).copied().unwrap_or(0)), f.id));
    ranked.truncate(count);
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorSort {
    Year,
    Likes,
}

impl DirectorSort {
    pub fn parse(s: &str) -> EngineResult<Self> {
        match s {
            "year" => Ok(DirectorSort::Year),
            "likes" => Ok(DirectorSort::Likes),
            other => Err(EngineError::InvalidArgument(format!(
                "unsupported sortBy value: {}",
                other
            ))),
        }
    }
}

/// A director's filmography sorted by release date or by popularity.
pub async fn films_by_director<R>(
    repo: &R,
    director_id: i64,
    sort: DirectorSort,
) -> EngineResult<Vec<Film>>
where
    R: FilmRepo + DirectorRepo + ?Sized,
{
    repo.get_director(director_id).await?;
    let films = repo.films_by_director(director_id).await?;
    let likes = repo.like_counts().await?;
    Ok(sort_director_films(films, &likes, sort))
}

pub fn sort_director_films(
    mut films: Vec<Film>,
    likes: &HashMap<i64, i64>,
    sort: DirectorSort,
) -> Vec<Film> {
    match sort {
        // Undated films sort first, matching how the store would order nulls.
        DirectorSort::Year => films.sort_by_key(|f| (f.release_date, f.id)),
        DirectorSort::Likes => {
            films.sort_by_key(|f| (Reverse(likes.get(&f.id).copied().unwrap_or(0)), f.id))
        }
    }
    films
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Genre;
    use chrono::NaiveDate;

    fn film(id: i64, genre_id: i64, year: i32) -> Film {
        Film {
            id,
            name: format!("film-{}", id),
            description: None,
            release_date: NaiveDate::from_ymd_opt(year, 6, 1),
            duration: 100,
            mpa: None,
            genres: vec![Genre { id: genre_id, name: format!("genre-{}", genre_id) }],
            directors: Vec::new(),
        }
    }

    const COMEDY: i64 = 1;
    const DRAMA: i64 = 2;

    fn fixture() -> (Vec<Film>, HashMap<i64, i64>) {
        // F1 Comedy/2000 with 3 likes, F2 Drama/2000 with 1, F3 Comedy/2005 with 5.
        let films = vec![film(1, COMEDY, 2000), film(2, DRAMA, 2000), film(3, COMEDY, 2005)];
        let likes = HashMap::from([(1, 3), (2, 1), (3, 5)]);
        (films, likes)
    }

    #[test]
    fn test_rank_unfiltered_orders_by_like_count() {
        let (films, likes) = fixture();
        let ranked = rank_by_popularity(films, &likes, 10, None, None);
        let ids: Vec<i64> = ranked.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_rank_with_both_filters() {
        let (films, likes) = fixture();
        let ranked = rank_by_popularity(films, &likes, 10, Some(COMEDY), Some(2000));
        let ids: Vec<i64> = ranked.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_rank_genre_filter_excludes_other_genres() {
        let (films, likes) = fixture();
        let ranked = rank_by_popularity(films, &likes, 10, Some(DRAMA), None);
        assert!(ranked.iter().all(|f| f.has_genre(DRAMA)));
        let ids: Vec<i64> = ranked.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_rank_year_filter_excludes_other_years() {
        let (films, likes) = fixture();
        let ranked = rank_by_popularity(films, &likes, 10, None, Some(2000));
        assert!(ranked.iter().all(|f| f.release_year() == Some(2000)));
    }

    #[test]
    fn test_rank_truncates_to_count() {
        let (films, likes) = fixture();
        let ranked = rank_by_popularity(films, &likes, 2, None, None);
        let ids: Vec<i64> = ranked.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_rank_ties_break_by_ascending_id() {
        let films = vec![film(7, COMEDY, 2000), film(2, COMEDY, 2000), film(5, COMEDY, 2000)];
        let likes = HashMap::from([(7, 4), (2, 4), (5, 4)]);
        let ranked = rank_by_popularity(films, &likes, 10, None, None);
        let ids: Vec<i64> = ranked.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![2, 5, 7]);
    }

    #[test]
    fn test_rank_films_without_likes_count_as_zero() {
        let films = vec![film(1, COMEDY, 2000), film(2, COMEDY, 2000)];
        let likes = HashMap::from([(2, 1)]);
        let ranked = rank_by_popularity(films, &likes, 10, None, None);
        let ids: Vec<i64> = ranked.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_director_sort_by_year() {
        let mut undated = film(3, COMEDY, 2000);
        undated.release_date = None;
        let films = vec![film(1, COMEDY, 2010), film(2, COMEDY, 1995), undated];
        let sorted = sort_director_films(films, &HashMap::new(), DirectorSort::Year);
        let ids: Vec<i64> = sorted.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_director_sort_by_likes() {
        let films = vec![film(1, COMEDY, 2010), film(2, COMEDY, 1995)];
        let likes = HashMap::from([(2, 9), (1, 1)]);
        let sorted = sort_director_films(films, &likes, DirectorSort::Likes);
        let ids: Vec<i64> = sorted.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_director_sort_parse() {
        assert_eq!(DirectorSort::parse("year").unwrap(), DirectorSort::Year);
        assert_eq!(DirectorSort::parse("likes").unwrap(), DirectorSort::Likes);
        assert!(DirectorSort::parse("rating").is_err());
    }
}
