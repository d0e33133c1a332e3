//! prereg HTTP service library
//!
//! Accepts pre-registration signups, contact messages and posts over
//! REST-over-JSON and persists them to a `SQLite` record store:
//! - `storage`: record store client, models and typed write outcome
//! - `routes`: axum handlers and router assembly
//! - `response`: JSON envelope and HTTP error mapping

pub mod response;
pub mod routes;
pub mod storage;
