//! `prereg` Core Library
//!
//! Shared functionality for the `prereg` service:
//! - `SQLite` pool creation and the `define_database!` store scaffold
//! - Field-presence and email-format validation
//! - Tracing subscriber setup
//! - Common error types

pub mod db;
pub mod error;
pub mod tracing_init;
pub mod validation;

pub use error::{Error, Result};
