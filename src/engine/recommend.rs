//! Nearest-neighbor recommendations over the like graph.
//!
//! The neighbor is the user sharing the most liked films with the target;
//! the recommendation is everything that neighbor liked and the target has
//! not seen. One neighbor only, no weighting.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::db::{Film, FilmRepo, LikeEdge, UserRepo};
use crate::engine::{order_by_ids, EngineResult};

/// Films liked by the user's closest neighbor that the user has not liked,
/// ascending by film id. Empty when no other user shares a like.
pub async fn recommend<R>(repo: &R, user_id: i64) -> EngineResult<Vec<Film>>
where
    R: FilmRepo + UserRepo + ?Sized,
{
    repo.get_user(user_id).await?;
    let edges = repo.like_edges().await?;
    let ids = recommend_film_ids(&edges, user_id);
    let films = repo.films_by_ids(&ids).await?;
    Ok(order_by_ids(films, &ids, |f| f.id))
}

/// Pure pipeline over the full like-edge set: pick the neighbor, then diff
/// their likes against ours.
pub fn recommend_film_ids(edges: &[LikeEdge], user_id: i64) -> Vec<i64> {
    let ours: HashSet<i64> = edges
        .iter()
        .filter(|e| e.user_id == user_id)
        .map(|e| e.film_id)
        .collect();
    let neighbor = match select_neighbor(edges, user_id, &ours) {
        Some(id) => id,
        None => return Vec::new(),
    };
    let mut candidates: Vec<i64> = edges
        .iter()
        .filter(|e| e.user_id == neighbor && !ours.contains(&e.film_id))
        .map(|e| e.film_id)
        .collect();
    candidates.sort_unstable();
    candidates.dedup();
    candidates
}

/// The other user with the largest like overlap; smallest user id wins ties.
/// None when nobody shares a single liked film.
fn select_neighbor(edges: &[LikeEdge], user_id: i64, ours: &HashSet<i64>) -> Option<i64> {
    let mut overlap: HashMap<i64, i64> = HashMap::new();
    for edge in edges {
        if edge.user_id != user_id && ours.contains(&edge.film_id) {
            *overlap.entry(edge.user_id).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(i64, i64)> = overlap.into_iter().collect();
    ranked.sort_by_key(|&(id, count)| (Reverse(count), id));
    ranked.first().map(|&(id, _)| id)
}
