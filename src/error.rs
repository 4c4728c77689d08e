//! Typed failures for the two OMDb lookups and the favorites file.
//!
//! Transport-level detail is carried as an [`anyhow::Error`] so the client can
//! attach context at every step; callers only branch on the variant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Blank or whitespace-only query. No request is made.
    #[error("search query is empty")]
    EmptyQuery,

    /// The service answered but matched nothing.
    #[error("no results: {message}")]
    NoResults { message: String },

    #[error("search request failed: {0:#}")]
    Transport(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum DetailError {
    #[error("detail lookup requires an imdb id")]
    MissingId,

    #[error("title not found: {message}")]
    NotFound { message: String },

    #[error("detail request failed: {0:#}")]
    Transport(#[source] anyhow::Error),
}

/// Favorites file could not be read, parsed or written.
///
/// Never surfaced to the user: the store logs it and keeps working in memory.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("favorites I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("favorites JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
