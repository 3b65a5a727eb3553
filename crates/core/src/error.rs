//! Unified error types for the contributions pipeline.
//!
//! Every stage (resolver, client, parser, cache) reports through [`Error`].
//! The HTTP layer decides which variants are client faults and which are
//! surfaced as a generic failure.

use tokio_rusqlite::rusqlite;

/// Unified error type for the contributions pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed year selector or response format.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The source service has no contribution data for this username.
    #[error("USER_NOT_FOUND: {0}")]
    UserNotFound(String),

    /// Network error or unexpected status while retrieving a page.
    #[error("FETCH_FAILED: {0}")]
    FetchFailed(String),

    /// Retrieval exceeded the transport timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Response body exceeded the configured byte limit.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Markup present but structurally unparseable or inconsistent.
    #[error("PARSE_FAILED: {0}")]
    ParseFailed(String),

    /// Cache database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Server-side setup problem: an unusable path, URL or duration.
    #[error("CONFIG_ERROR: {0}")]
    Config(String),

    /// A cached value could not be decoded.
    #[error("CACHE_ERROR: corrupt entry: {0}")]
    CorruptEntry(String),
}

impl Error {
    /// Whether the failure was caused by the caller's input.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::UserNotFound(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::CorruptEntry(err.to_string())
    }
}
