//! Shared API request/response types

use serde::{Deserialize, Serialize};

/// One entry of the multi-result lookup (`GET /jsonapi`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricCandidate {
    /// Content fingerprint of `lyrics`
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Canonical LRC text
    pub lyrics: String,
}

/// Tag fields accepted by `POST /tag`
///
/// Fields left out are not touched on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
}

impl TagFields {
    /// True when at least one non-lyric field is set
    pub fn has_text_fields(&self) -> bool {
        self.title.is_some() || self.artist.is_some() || self.album.is_some()
    }
}

/// `POST /login-api` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// `POST /login-api` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
}
