//! Upstream lyric providers and the cover-art client
//!
//! A provider turns title/artist/album into zero or more raw lyric texts.
//! Errors stay inside the provider boundary: callers log them and treat the
//! provider as having returned nothing.

pub mod cover;
pub mod lrclib;

use async_trait::async_trait;
use thiserror::Error;

pub use cover::CoverClient;
pub use lrclib::LrclibProvider;

/// Provider call errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// An upstream lyric lookup service
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Raw lyric texts matching the track, best match first
    async fn search(
        &self,
        title: &str,
        artist: &str,
        album: &str,
    ) -> Result<Vec<String>, ProviderError>;
}
