use std::collections::HashMap;
use std::fmt::Write;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{info, warn};

use super::model::*;
use super::repo::*;

pub struct SqliteRepository {
    pool: SqlitePool,
}

type FilmRow = (i64, String, Option<String>, Option<String>, i32, Option<i64>, Option<String>);
type UserRow = (i64, String, String, Option<String>, Option<String>);

const FILM_BASE_QUERY: &str = "SELECT f.id, f.name, f.description, f.release_date, f.duration, \
     f.mpa_id, m.name AS mpa_name \
     FROM film AS f \
     LEFT JOIN mpa AS m ON f.mpa_id = m.id";

impl SqliteRepository {
    pub async fn new(db_path: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(db_path)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.init_schema().await?;

        info!("Database initialized at {}", db_path);

        Ok(repo)
    }

    async fn init_schema(&self) -> DbResult<()> {
        let schema = include_str!("schema.sql");
        sqlx::raw_sql(schema).execute(&self.pool).await?;
        Ok(())
    }

    fn row_to_film(row: FilmRow) -> Film {
        let mpa = match (row.5, row.6) {
            (Some(id), Some(name)) => Some(Mpa { id, name }),
            _ => None,
        };
        Film {
            id: row.0,
            name: row.1,
            description: row.2,
            release_date: row.3.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            duration: row.4,
            mpa,
            genres: Vec::new(),
            directors: Vec::new(),
        }
    }

    fn row_to_user(row: UserRow) -> User {
        User {
            id: row.0,
            email: row.1,
            login: row.2,
            name: row.3,
            birthday: row.4.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        }
    }

    fn in_clause(ids: &[i64]) -> String {
        let mut list = String::new();
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                list.push(',');
            }
            let _ = write!(&mut list, "{}", id);
        }
        list
    }

    /// Resolves genre and director links for the given films in one pass.
    async fn attach_links(&self, films: &mut [Film]) -> DbResult<()> {
        if films.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = films.iter().map(|f| f.id).collect();
        let list = Self::in_clause(&ids);

        let genre_rows = sqlx::query_as::<_, (i64, i64, String)>(&format!(
            "SELECT fg.film_id, fg.genre_id, g.name \
             FROM film_genre AS fg \
             JOIN genre AS g ON fg.genre_id = g.id \
             WHERE fg.film_id IN ({}) \
             ORDER BY fg.film_id, fg.genre_id",
            list
        ))
        .fetch_all(&self.pool)
        .await?;

        let director_rows = sqlx::query_as::<_, (i64, i64, String)>(&format!(
            "SELECT fd.film_id, fd.director_id, d.name \
             FROM film_director AS fd \
             JOIN director AS d ON fd.director_id = d.id \
             WHERE fd.film_id IN ({}) \
             ORDER BY fd.film_id, fd.director_id",
            list
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut genres: HashMap<i64, Vec<Genre>> = HashMap::new();
        for (film_id, id, name) in genre_rows {
            genres.entry(film_id).or_default().push(Genre { id, name });
        }
        let mut directors: HashMap<i64, Vec<Director>> = HashMap::new();
        for (film_id, id, name) in director_rows {
            directors.entry(film_id).or_default().push(Director { id, name });
        }

        for film in films.iter_mut() {
            for genre in genres.remove(&film.id).unwrap_or_default() {
                film.add_genre(genre);
            }
            for director in directors.remove(&film.id).unwrap_or_default() {
                film.add_director(director);
            }
        }
        Ok(())
    }

    async fn insert_film_links(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        film: &Film,
        film_id: i64,
    ) -> DbResult<()> {
        for genre in &film.genres {
            sqlx::query("INSERT OR IGNORE INTO film_genre (film_id, genre_id) VALUES (?, ?)")
                .bind(film_id)
                .bind(genre.id)
                .execute(&mut **tx)
                .await
                .map_err(|e| map_fk(e, format!("genre {}", genre.id)))?;
        }
        for director in &film.directors {
            sqlx::query("INSERT OR IGNORE INTO film_director (film_id, director_id) VALUES (?, ?)")
                .bind(film_id)
                .bind(director.id)
                .execute(&mut **tx)
                .await
                .map_err(|e| map_fk(e, format!("director {}", director.id)))?;
        }
        Ok(())
    }
}

/// Sqlite reports referential failures as generic database errors; surface
/// them as a distinct variant so callers can turn them into NotFound.
fn map_fk(e: sqlx::Error, what: impl Into<String>) -> DbError {
    match &e {
        sqlx::Error::Database(db) if db.message().contains("FOREIGN KEY") => {
            DbError::ForeignKey(what.into())
        }
        _ => DbError::Sqlx(e),
    }
}

#[async_trait]
impl FilmRepo for SqliteRepository {
    async fn create_film(&self, film: &Film) -> DbResult<Film> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "INSERT INTO film (name, description, release_date, duration, mpa_id) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(film.duration)
        .bind(film.mpa.as_ref().map(|m| m.id))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_fk(e, "mpa rating"))?;

        let id = result.last_insert_rowid();
        Self::insert_film_links(&mut tx, film, id).await?;
        tx.commit().await?;

        self.get_film(id).await
    }

    async fn update_film(&self, film: &Film) -> DbResult<Film> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE film SET name = ?, description = ?, release_date = ?, duration = ?, mpa_id = ? \
             WHERE id = ?",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(film.duration)
        .bind(film.mpa.as_ref().map(|m| m.id))
        .bind(film.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_fk(e, "mpa rating"))?;

        if result.rows_affected() < 1 {
            return Err(DbError::NotFound(format!("Film not found: {}", film.id)));
        }

        sqlx::query("DELETE FROM film_genre WHERE film_id = ?")
            .bind(film.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM film_director WHERE film_id = ?")
            .bind(film.id)
            .execute(&mut *tx)
            .await?;
        Self::insert_film_links(&mut tx, film, film.id).await?;
        tx.commit().await?;

        self.get_film(film.id).await
    }

    async fn list_films(&self) -> DbResult<Vec<Film>> {
        let rows = sqlx::query_as::<_, FilmRow>(&format!("{} ORDER BY f.id", FILM_BASE_QUERY))
            .fetch_all(&self.pool)
            .await?;
        let mut films: Vec<Film> = rows.into_iter().map(Self::row_to_film).collect();
        self.attach_links(&mut films).await?;
        Ok(films)
    }

    async fn get_film(&self, id: i64) -> DbResult<Film> {
        let row = sqlx::query_as::<_, FilmRow>(&format!("{} WHERE f.id = ?", FILM_BASE_QUERY))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => DbError::NotFound(format!("Film not found: {}", id)),
                _ => DbError::Sqlx(e),
            })?;
        let mut films = vec![Self::row_to_film(row)];
        self.attach_links(&mut films).await?;
        Ok(films.remove(0))
    }

    async fn delete_film(&self, id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM film WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn films_by_ids(&self, ids: &[i64]) -> DbResult<Vec<Film>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, FilmRow>(&format!(
            "{} WHERE f.id IN ({}) ORDER BY f.id",
            FILM_BASE_QUERY,
            Self::in_clause(ids)
        ))
        .fetch_all(&self.pool)
        .await?;
        let mut films: Vec<Film> = rows.into_iter().map(Self::row_to_film).collect();
        self.attach_links(&mut films).await?;
        Ok(films)
    }

    async fn films_by_director(&self, director_id: i64) -> DbResult<Vec<Film>> {
        let rows = sqlx::query_as::<_, FilmRow>(&format!(
            "{} WHERE f.id IN (SELECT film_id FROM film_director WHERE director_id = ?) \
             ORDER BY f.id",
            FILM_BASE_QUERY
        ))
        .bind(director_id)
        .fetch_all(&self.pool)
        .await?;
        let mut films: Vec<Film> = rows.into_iter().map(Self::row_to_film).collect();
        self.attach_links(&mut films).await?;
        Ok(films)
    }

    async fn put_like(&self, film_id: i64, user_id: i64) -> DbResult<()> {
        sqlx::query("INSERT OR IGNORE INTO film_likes (film_id, user_id) VALUES (?, ?)")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_fk(e, format!("film {} or user {}", film_id, user_id)))?;
        Ok(())
    }

    async fn delete_like(&self, film_id: i64, user_id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM film_likes WHERE film_id = ? AND user_id = ?")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn like_counts(&self) -> DbResult<HashMap<i64, i64>> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            "SELECT film_id, COUNT(user_id) FROM film_likes GROUP BY film_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn liked_film_ids(&self, user_id: i64) -> DbResult<Vec<i64>> {
        let rows = sqlx::query_as::<_, (i64,)>(
            "SELECT film_id FROM film_likes WHERE user_id = ? ORDER BY film_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn like_edges(&self) -> DbResult<Vec<LikeEdge>> {
        let edges = sqlx::query_as::<_, LikeEdge>("SELECT film_id, user_id FROM film_likes")
            .fetch_all(&self.pool)
            .await?;
        Ok(edges)
    }
}

#[async_trait]
impl UserRepo for SqliteRepository {
    async fn create_user(&self, user: &User) -> DbResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (email, login, name, birthday) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday.map(|d| d.format("%Y-%m-%d").to_string()))
        .execute(&self.pool)
        .await?;

        let mut created = user.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn update_user(&self, user: &User) -> DbResult<User> {
        let result = sqlx::query(
            "UPDATE users SET email = ?, login = ?, name = ?, birthday = ? WHERE id = ?",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() < 1 {
            return Err(DbError::NotFound(format!("User not found: {}", user.id)));
        }
        Ok(user.clone())
    }

    async fn list_users(&self) -> DbResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, login, name, birthday FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Self::row_to_user).collect())
    }

    async fn get_user(&self, id: i64) -> DbResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, login, name, birthday FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => DbError::NotFound(format!("User not found: {}", id)),
            _ => DbError::Sqlx(e),
        })?;
        Ok(Self::row_to_user(row))
    }

    async fn delete_user(&self, id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn users_by_ids(&self, ids: &[i64]) -> DbResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT id, email, login, name, birthday FROM users WHERE id IN ({})",
            Self::in_clause(ids)
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Self::row_to_user).collect())
    }

    async fn add_friend(&self, user_id: i64, friend_id: i64) -> DbResult<()> {
        sqlx::query("INSERT OR IGNORE INTO friend (user_id, friend_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_fk(e, format!("user {} or friend {}", user_id, friend_id)))?;
        Ok(())
    }

    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM friend WHERE user_id = ? AND friend_id = ?")
            .bind(user_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn friend_ids(&self, user_id: i64) -> DbResult<Vec<i64>> {
        let rows = sqlx::query_as::<_, (i64,)>(
            "SELECT friend_id FROM friend WHERE user_id = ? ORDER BY rowid",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}

#[async_trait]
impl DirectorRepo for SqliteRepository {
    async fn create_director(&self, director: &Director) -> DbResult<Director> {
        let result = sqlx::query("INSERT INTO director (name) VALUES (?)")
            .bind(&director.name)
            .execute(&self.pool)
            .await?;
        Ok(Director {
            id: result.last_insert_rowid(),
            name: director.name.clone(),
        })
    }

    async fn update_director(&self, director: &Director) -> DbResult<Director> {
        let result = sqlx::query("UPDATE director SET name = ? WHERE id = ?")
            .bind(&director.name)
            .bind(director.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() < 1 {
            return Err(DbError::NotFound(format!("Director not found: {}", director.id)));
        }
        Ok(director.clone())
    }

    async fn list_directors(&self) -> DbResult<Vec<Director>> {
        let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM director ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id, name)| Director { id, name }).collect())
    }

    async fn get_director(&self, id: i64) -> DbResult<Director> {
        let row = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM director WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    DbError::NotFound(format!("Director not found: {}", id))
                }
                _ => DbError::Sqlx(e),
            })?;
        Ok(Director { id: row.0, name: row.1 })
    }

    async fn delete_director(&self, id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM director WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl GenreRepo for SqliteRepository {
    async fn list_genres(&self) -> DbResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM genre ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id, name)| Genre { id, name }).collect())
    }

    async fn get_genre(&self, id: i64) -> DbResult<Genre> {
        let row = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM genre WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => DbError::NotFound(format!("Genre not found: {}", id)),
                _ => DbError::Sqlx(e),
            })?;
        Ok(Genre { id: row.0, name: row.1 })
    }
}

#[async_trait]
impl MpaRepo for SqliteRepository {
    async fn list_mpa(&self) -> DbResult<Vec<Mpa>> {
        let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM mpa ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id, name)| Mpa { id, name }).collect())
    }

    async fn get_mpa(&self, id: i64) -> DbResult<Mpa> {
        let row = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM mpa WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => DbError::NotFound(format!("Mpa not found: {}", id)),
                _ => DbError::Sqlx(e),
            })?;
        Ok(Mpa { id: row.0, name: row.1 })
    }
}

const REVIEW_BASE_QUERY: &str =
    "SELECT id AS review_id, content, is_positive, user_id, film_id, useful FROM review";

async fn apply_vote_in(
    conn: &mut sqlx::SqliteConnection,
    review_id: i64,
    user_id: i64,
    vote: VoteKind,
) -> DbResult<()> {
    let existing = sqlx::query_as::<_, (bool,)>(
        "SELECT is_like FROM review_votes WHERE review_id = ? AND user_id = ?",
    )
    .bind(review_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    .map(|(is_like,)| VoteKind::from_is_like(is_like));

    // Same-kind repeat: nothing to write, the commit is empty.
    let Some(delta) = vote_transition(existing, vote) else {
        return Ok(());
    };

    sqlx::query(
        "INSERT OR REPLACE INTO review_votes (review_id, user_id, is_like) VALUES (?, ?, ?)",
    )
    .bind(review_id)
    .bind(user_id)
    .bind(vote.is_like())
    .execute(&mut *conn)
    .await
    .map_err(|e| map_fk(e, format!("review {} or user {}", review_id, user_id)))?;

    sqlx::query("UPDATE review SET useful = useful + ? WHERE id = ?")
        .bind(delta)
        .bind(review_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

async fn remove_vote_in(
    conn: &mut sqlx::SqliteConnection,
    review_id: i64,
    user_id: i64,
    vote: VoteKind,
) -> DbResult<()> {
    let removed = sqlx::query(
        "DELETE FROM review_votes WHERE review_id = ? AND user_id = ? AND is_like = ?",
    )
    .bind(review_id)
    .bind(user_id)
    .bind(vote.is_like())
    .execute(&mut *conn)
    .await?
    .rows_affected();

    // Only reverse the delta when an edge actually existed, otherwise
    // usefulness would drift away from the vote balance.
    if removed > 0 {
        sqlx::query("UPDATE review SET useful = useful - ? WHERE id = ?")
            .bind(vote.delta())
            .bind(review_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

#[async_trait]
impl ReviewRepo for SqliteRepository {
    async fn create_review(&self, review: &Review) -> DbResult<Review> {
        let result = sqlx::query(
            "INSERT INTO review (content, is_positive, user_id, film_id, useful) \
             VALUES (?, ?, ?, ?, 0)",
        )
        .bind(&review.content)
        .bind(review.is_positive)
        .bind(review.user_id)
        .bind(review.film_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_fk(e, format!("film {} or user {}", review.film_id, review.user_id)))?;

        self.get_review(result.last_insert_rowid()).await
    }

    async fn update_review(&self, review: &Review) -> DbResult<Review> {
        let result = sqlx::query("UPDATE review SET content = ?, is_positive = ? WHERE id = ?")
            .bind(&review.content)
            .bind(review.is_positive)
            .bind(review.review_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() < 1 {
            return Err(DbError::NotFound(format!("Review not found: {}", review.review_id)));
        }
        self.get_review(review.review_id).await
    }

    async fn delete_review(&self, id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM review WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_review(&self, id: i64) -> DbResult<Review> {
        sqlx::query_as::<_, Review>(&format!("{} WHERE id = ?", REVIEW_BASE_QUERY))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => DbError::NotFound(format!("Review not found: {}", id)),
                _ => DbError::Sqlx(e),
            })
    }

    async fn list_reviews(&self, count: i64) -> DbResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "{} ORDER BY useful DESC, id LIMIT ?",
            REVIEW_BASE_QUERY
        ))
        .bind(count)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn film_reviews(&self, film_id: i64, count: i64) -> DbResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "{} WHERE film_id = ? ORDER BY useful DESC, id LIMIT ?",
            REVIEW_BASE_QUERY
        ))
        .bind(film_id)
        .bind(count)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn apply_vote(&self, review_id: i64, user_id: i64, vote: VoteKind) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        // Start IMMEDIATE: a deferred transaction would take a shared lock at
        // the SELECT, and two concurrent votes upgrading to reserved deadlock
        // into an instant SQLITE_BUSY. Immediate transactions queue instead.
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
        match apply_vote_in(&mut conn, review_id, user_id, vote).await {
            Ok(()) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(())
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(e)
            }
        }
    }

    async fn remove_vote(&self, review_id: i64, user_id: i64, vote: VoteKind) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
        match remove_vote_in(&mut conn, review_id, user_id, vote).await {
            Ok(()) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(())
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl FeedRepo for SqliteRepository {
    async fn record_event(&self, event: &FeedEvent) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO feed (timestamp, user_id, event_type, operation, entity_id) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(event.timestamp)
        .bind(event.user_id)
        .bind(event.event_type.as_str())
        .bind(event.operation.as_str())
        .bind(event.entity_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn user_feed(&self, user_id: i64) -> DbResult<Vec<FeedEvent>> {
        let rows = sqlx::query_as::<_, (i64, i64, i64, String, String, i64)>(
            "SELECT event_id, timestamp, user_id, event_type, operation, entity_id \
             FROM feed WHERE user_id = ? ORDER BY event_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for (event_id, timestamp, user_id, event_type, operation, entity_id) in rows {
            let (Some(event_type), Some(operation)) =
                (EventType::parse(&event_type), Operation::parse(&operation))
            else {
                warn!("Skipping feed event {} with unknown type/operation", event_id);
                continue;
            };
            events.push(FeedEvent {
                event_id,
                timestamp,
                user_id,
                event_type,
                operation,
                entity_id,
            });
        }
        Ok(events)
    }
}
