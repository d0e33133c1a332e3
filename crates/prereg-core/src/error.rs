//! Error types for `prereg` core library.

use thiserror::Error;

/// Result type alias using `prereg` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `prereg` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
