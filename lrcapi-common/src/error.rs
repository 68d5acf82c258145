//! Errors raised by the shared library

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of config loading, user-data storage and lookup validation
#[derive(Error, Debug)]
pub enum Error {
    /// User-data database (cookie secret storage)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Config file or data directory I/O
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file that cannot be parsed or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lookup carrying neither a path nor a title
    #[error("Invalid lookup: {0}")]
    InvalidLookup(String),
}
