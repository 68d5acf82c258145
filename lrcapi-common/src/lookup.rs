//! Lookup requests and cache keys

use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A lyric lookup as received from a player
///
/// Empty strings are treated as absent. A request needs a `path` or a `title`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupRequest {
    pub path: Option<PathBuf>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl LookupRequest {
    /// Build a request from decoded query pairs (`path`, `title`, `artist`, `album`)
    ///
    /// Unknown keys are ignored; for repeated keys the first value wins.
    pub fn from_query(pairs: &[(String, String)]) -> Self {
        let get = |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            path: get("path").map(PathBuf::from),
            title: get("title"),
            artist: get("artist"),
            album: get("album"),
        }
    }

    /// Reject requests carrying neither a path nor a title
    pub fn validate(&self) -> Result<()> {
        if self.path.is_none() && self.title.is_none() {
            return Err(Error::InvalidLookup(
                "either 'path' or 'title' is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Sidecar lyric file next to the audio file (`song.flac` -> `song.lrc`)
    pub fn sidecar_path(&self) -> Option<PathBuf> {
        self.path.as_deref().map(sidecar_for)
    }

    pub fn title_str(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn artist_str(&self) -> &str {
        self.artist.as_deref().unwrap_or_default()
    }

    pub fn album_str(&self) -> &str {
        self.album.as_deref().unwrap_or_default()
    }
}

/// Replace (or append) the extension with `.lrc`
pub fn sidecar_for(path: &Path) -> PathBuf {
    path.with_extension("lrc")
}

/// Cache key for a request: route path plus an order-independent parameter hash
///
/// Parameters are treated as a set, so reordering or repeating identical
/// pairs yields the same key.
///
/// # Examples
///
/// ```
/// use lrcapi_common::cache_key;
///
/// let a = vec![("title".to_string(), "A".to_string()), ("artist".to_string(), "B".to_string())];
/// let b = vec![("artist".to_string(), "B".to_string()), ("title".to_string(), "A".to_string())];
/// assert_eq!(cache_key("/lyrics", &a), cache_key("/lyrics", &b));
/// assert_ne!(cache_key("/lyrics", &a), cache_key("/jsonapi", &a));
/// ```
pub fn cache_key(route: &str, params: &[(String, String)]) -> String {
    let unique: BTreeSet<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let mut hasher = Sha256::new();
    for (k, v) in unique {
        // length prefixes keep ("a", "bc") and ("ab", "c") apart
        hasher.update((k.len() as u64).to_le_bytes());
        hasher.update(k.as_bytes());
        hasher.update((v.len() as u64).to_le_bytes());
        hasher.update(v.as_bytes());
    }

    format!("{}#{:x}", route, hasher.finalize())
}
