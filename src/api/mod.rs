//! HTTP handlers, grouped by resource.

pub mod catalog;
pub mod films;
pub mod reviews;
pub mod users;
