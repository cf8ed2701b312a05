//! Payload validation applied before anything touches the store.

use std::sync::OnceLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;

use crate::db::{Director, Film, User};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(String);

fn fail(msg: impl Into<String>) -> Result<(), ValidationError> {
    Err(ValidationError(msg.into()))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

/// Cinema was born on 1895-12-28; no film can predate it.
fn earliest_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1895, 12, 28).unwrap_or_default()
}

pub fn validate_film(film: &Film) -> Result<(), ValidationError> {
    if film.name.trim().is_empty() {
        return fail("Film name must not be blank");
    }
    if let Some(ref description) = film.description {
        if description.chars().count() > 200 {
            return fail("Film description must be at most 200 characters");
        }
    }
    if let Some(date) = film.release_date {
        if date <= earliest_release_date() {
            return fail(format!(
                "Film release date must be after {}",
                earliest_release_date()
            ));
        }
    }
    if film.duration < 1 {
        return fail("Film duration must be positive");
    }
    Ok(())
}

pub fn validate_user(user: &User) -> Result<(), ValidationError> {
    if !email_regex().is_match(&user.email) {
        return fail(format!("Invalid email address: {}", user.email));
    }
    if user.login.is_empty() || user.login.chars().any(char::is_whitespace) {
        return fail("Login must be non-empty and contain no whitespace");
    }
    if let Some(birthday) = user.birthday {
        if birthday > Utc::now().date_naive() {
            return fail("Birthday cannot be in the future");
        }
    }
    Ok(())
}

pub fn validate_director(director: &Director) -> Result<(), ValidationError> {
    if director.name.trim().is_empty() {
        return fail("Director name must not be blank");
    }
    Ok(())
}
