//! SQLite-backed record store for the prereg service.
//!
//! Persists registrations, contact messages and posts. Uniqueness of
//! registration emails and usernames is enforced by the store's indexes and
//! reported back as [`StoreError::Conflict`].

mod db;
mod models;
mod queries;

#[cfg(test)]
mod tests;

pub use db::{DatabaseError, RecordStore, StoreError};
pub use models::*;
pub use queries::{NewContactMessage, NewPost, NewRegistration};
