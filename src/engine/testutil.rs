//! In-memory repository stub backing the engine orchestration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::*;

pub fn user(id: i64) -> User {
    User {
        id,
        email: format!("user{}@example.com", id),
        login: format!("user{}", id),
        name: None,
        birthday: None,
    }
}

pub fn film(id: i64, name: &str) -> Film {
    Film {
        id,
        name: name.to_string(),
        description: None,
        release_date: None,
        duration: 100,
        mpa: None,
        genres: Vec::new(),
        directors: Vec::new(),
    }
}

#[derive(Default)]
pub struct StubRepo {
    pub users: Mutex<HashMap<i64, User>>,
    pub films: Mutex<HashMap<i64, Film>>,
    pub friends: Mutex<Vec<(i64, i64)>>,
    pub likes: Mutex<Vec<LikeEdge>>,
    pub reviews: Mutex<HashMap<i64, Review>>,
    pub votes: Mutex<HashMap<(i64, i64), VoteKind>>,
    pub events: Mutex<Vec<FeedEvent>>,
}

impl StubRepo {
    pub fn add_user(&self, id: i64) {
        self.users.lock().unwrap().insert(id, user(id));
    }

    pub fn add_film(&self, id: i64, name: &str) {
        self.films.lock().unwrap().insert(id, film(id, name));
    }

    pub fn add_like(&self, film_id: i64, user_id: i64) {
        self.likes.lock().unwrap().push(LikeEdge { film_id, user_id });
    }

    pub fn add_review(&self, review_id: i64, film_id: i64, user_id: i64) {
        self.reviews.lock().unwrap().insert(
            review_id,
            Review {
                review_id,
                content: format!("review-{}", review_id),
                is_positive: true,
                user_id,
                film_id,
                useful: 0,
            },
        );
    }

    pub fn useful(&self, review_id: i64) -> i64 {
        self.reviews.lock().unwrap()[&review_id].useful
    }

    pub fn recorded_events(&self) -> Vec<FeedEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepo for StubRepo {
    async fn create_user(&self, _user: &User) -> DbResult<User> {
        unimplemented!()
    }

    async fn update_user(&self, _user: &User) -> DbResult<User> {
        unimplemented!()
    }

    async fn list_users(&self) -> DbResult<Vec<User>> {
        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn get_user(&self, id: i64) -> DbResult<User> {
        self.users
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("User not found: {}", id)))
    }

    async fn delete_user(&self, _id: i64) -> DbResult<()> {
        unimplemented!()
    }

    async fn users_by_ids(&self, ids: &[i64]) -> DbResult<Vec<User>> {
        let users = self.users.lock().unwrap();
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn add_friend(&self, user_id: i64, friend_id: i64) -> DbResult<()> {
        {
            let users = self.users.lock().unwrap();
            if !users.contains_key(&user_id) || !users.contains_key(&friend_id) {
                return Err(DbError::ForeignKey(format!(
                    "user {} or friend {}",
                    user_id, friend_id
                )));
            }
        }
        let mut friends = self.friends.lock().unwrap();
        if !friends.contains(&(user_id, friend_id)) {
            friends.push((user_id, friend_id));
        }
        Ok(())
    }

    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> DbResult<()> {
        self.friends.lock().unwrap().retain(|e| *e != (user_id, friend_id));
        Ok(())
    }

    async fn friend_ids(&self, user_id: i64) -> DbResult<Vec<i64>> {
        Ok(self
            .friends
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, f)| *f)
            .collect())
    }
}

#[async_trait]
impl FilmRepo for StubRepo {
    async fn create_film(&self, _film: &Film) -> DbResult<Film> {
        unimplemented!()
    }

    async fn update_film(&self, _film: &Film) -> DbResult<Film> {
        unimplemented!()
    }

    async fn list_films(&self) -> DbResult<Vec<Film>> {
        let mut films: Vec<Film> = self.films.lock().unwrap().values().cloned().collect();
        films.sort_by_key(|f| f.id);
        Ok(films)
    }

    async fn get_film(&self, id: i64) -> DbResult<Film> {
        self.films
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("Film not found: {}", id)))
    }

    async fn delete_film(&self, _id: i64) -> DbResult<()> {
        unimplemented!()
    }

    async fn films_by_ids(&self, ids: &[i64]) -> DbResult<Vec<Film>> {
        let films = self.films.lock().unwrap();
        Ok(ids.iter().filter_map(|id| films.get(id).cloned()).collect())
    }

    async fn films_by_director(&self, _director_id: i64) -> DbResult<Vec<Film>> {
        unimplemented!()
    }

    async fn put_like(&self, film_id: i64, user_id: i64) -> DbResult<()> {
        {
            let users = self.users.lock().unwrap();
            let films = self.films.lock().unwrap();
            if !users.contains_key(&user_id) || !films.contains_key(&film_id) {
                return Err(DbError::ForeignKey(format!("film {} or user {}", film_id, user_id)));
            }
        }
        let mut likes = self.likes.lock().unwrap();
        let edge = LikeEdge { film_id, user_id };
        if !likes.contains(&edge) {
            likes.push(edge);
        }
        Ok(())
    }

    async fn delete_like(&self, film_id: i64, user_id: i64) -> DbResult<()> {
        self.likes.lock().unwrap().retain(|e| *e != LikeEdge { film_id, user_id });
        Ok(())
    }

    async fn like_counts(&self) -> DbResult<HashMap<i64, i64>> {
        let mut counts = HashMap::new();
        for edge in self.likes.lock().unwrap().iter() {
            *counts.entry(edge.film_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn liked_film_ids(&self, user_id: i64) -> DbResult<Vec<i64>> {
        let mut ids: Vec<i64> = self
            .likes
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.film_id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn like_edges(&self) -> DbResult<Vec<LikeEdge>> {
        Ok(self.likes.lock().unwrap().clone())
    }
}

#[async_trait]
impl ReviewRepo for StubRepo {
    async fn create_review(&self, review: &Review) -> DbResult<Review> {
        let mut reviews = self.reviews.lock().unwrap();
        let id = reviews.keys().max().copied().unwrap_or(0) + 1;
        let mut created = review.clone();
        created.review_id = id;
        created.useful = 0;
        reviews.insert(id, created.clone());
        Ok(created)
    }

    async fn update_review(&self, review: &Review) -> DbResult<Review> {
        let mut reviews = self.reviews.lock().unwrap();
        let stored = reviews
            .get_mut(&review.review_id)
            .ok_or_else(|| DbError::NotFound(format!("Review not found: {}", review.review_id)))?;
        stored.content = review.content.clone();
        stored.is_positive = review.is_positive;
        Ok(stored.clone())
    }

    async fn delete_review(&self, id: i64) -> DbResult<()> {
        self.reviews.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn get_review(&self, id: i64) -> DbResult<Review> {
        self.reviews
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("Review not found: {}", id)))
    }

    async fn list_reviews(&self, count: i64) -> DbResult<Vec<Review>> {
        let mut reviews: Vec<Review> = self.reviews.lock().unwrap().values().cloned().collect();
        reviews.sort_by_key(|r| (std::cmp::Reverse(r.useful), r.review_id));
        reviews.truncate(count as usize);
        Ok(reviews)
    }

    async fn film_reviews(&self, film_id: i64, count: i64) -> DbResult<Vec<Review>> {
        let mut reviews: Vec<Review> = self
            .reviews
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.film_id == film_id)
            .cloned()
            .collect();
        reviews.sort_by_key(|r| (std::cmp::Reverse(r.useful), r.review_id));
        reviews.truncate(count as usize);
        Ok(reviews)
    }

    async fn apply_vote(&self, review_id: i64, user_id: i64, vote: VoteKind) -> DbResult<()> {
        let mut votes = self.votes.lock().unwrap();
        let existing = votes.get(&(review_id, user_id)).copied();
        if let Some(delta) = vote_transition(existing, vote) {
            votes.insert((review_id, user_id), vote);
            if let Some(review) = self.reviews.lock().unwrap().get_mut(&review_id) {
                review.useful += delta;
            }
        }
        Ok(())
    }

    async fn remove_vote(&self, review_id: i64, user_id: i64, vote: VoteKind) -> DbResult<()> {
        let mut votes = self.votes.lock().unwrap();
        if votes.get(&(review_id, user_id)) == Some(&vote) {
            votes.remove(&(review_id, user_id));
            if let Some(review) = self.reviews.lock().unwrap().get_mut(&review_id) {
                review.useful -= vote.delta();
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FeedRepo for StubRepo {
    async fn record_event(&self, event: &FeedEvent) -> DbResult<()> {
        let mut events = self.events.lock().unwrap();
        let mut stored = event.clone();
        stored.event_id = events.len() as i64 + 1;
        events.push(stored);
        Ok(())
    }

    async fn user_feed(&self, user_id: i64) -> DbResult<Vec<FeedEvent>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}
