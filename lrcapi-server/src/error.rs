//! Error types for the lrcapi server
//!
//! Bodies are plain text. Clients of the lyrics API match on the status code
//! and show the body as-is.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::cache::CachedResponse;
use crate::resolver::ResolveError;
use crate::tags::TagError;

/// Status used when lyric text could not be written to the file
pub const STATUS_LYRICS_WRITE_FAILED: u16 = 523;
/// Status used when title/artist/album could not be written to the file
pub const STATUS_TAGS_WRITE_FAILED: u16 = 524;
/// Status used when an endpoint requires auth but no token is configured
pub const STATUS_AUTH_REQUIRED: u16 = 421;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials supplied but wrong (403)
    #[error("Authentication failed.")]
    Forbidden,

    /// Write endpoint called while no token is configured (421)
    #[error("Authentication required, but no token is configured.")]
    AuthRequired,

    /// Request carried no query parameters at all (404)
    #[error("Please provide query parameters")]
    MissingParameters,

    /// Neither path nor title given (404)
    #[error("{0}")]
    InvalidRequest(String),

    /// No source produced lyrics (404)
    #[error("Lyrics not found.")]
    NotFound,

    /// Cover upstream did not deliver an image (404)
    #[error("Cover not found.")]
    CoverNotFound,

    /// Tag body is not the expected JSON object (422)
    #[error("{0}")]
    InvalidJson(String),

    /// Tag target does not exist (404)
    #[error("File not found.")]
    FileNotFound,

    /// 523
    #[error("Failed to write lyrics")]
    LyricsWriteFailed,

    /// 524
    #[error("Failed to write tags")]
    TagsWriteFailed,

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Forbidden => 403,
            ApiError::AuthRequired => STATUS_AUTH_REQUIRED,
            ApiError::MissingParameters
            | ApiError::InvalidRequest(_)
            | ApiError::NotFound
            | ApiError::CoverNotFound
            | ApiError::FileNotFound => 404,
            ApiError::InvalidJson(_) => 422,
            ApiError::LyricsWriteFailed => STATUS_LYRICS_WRITE_FAILED,
            ApiError::TagsWriteFailed => STATUS_TAGS_WRITE_FAILED,
            ApiError::Internal(_) => 500,
        }
    }

    /// Response form used by the cache
    pub fn to_cached(&self) -> CachedResponse {
        CachedResponse::text(self.status(), self.to_string())
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidRequest(msg) => ApiError::InvalidRequest(msg),
            ResolveError::NotFound => ApiError::NotFound,
        }
    }
}

impl From<TagError> for ApiError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::FileNotFound(_) => ApiError::FileNotFound,
            TagError::LyricsFailed(_) => ApiError::LyricsWriteFailed,
            TagError::TagsFailed(_) => ApiError::TagsWriteFailed,
            TagError::Read(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref msg) = self {
            tracing::error!(error = %msg, "Request failed");
        }
        self.to_cached().into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
