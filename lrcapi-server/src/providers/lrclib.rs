//! LRCLIB provider
//!
//! LRCLIB is a free lyrics API serving synchronized (LRC) lyrics.
//! API Documentation: https://lrclib.net/docs

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{Provider, ProviderError};

const USER_AGENT: &str = concat!("LRCAPI/", env!("CARGO_PKG_VERSION"));

/// One hit of `GET /api/search`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LrclibRecord {
    #[serde(default)]
    pub plain_lyrics: Option<String>,
    #[serde(default)]
    pub synced_lyrics: Option<String>,
}

impl LrclibRecord {
    /// Synced lyrics when present, plain lyrics otherwise
    pub fn best_text(self) -> Option<String> {
        self.synced_lyrics
            .filter(|s| !s.trim().is_empty())
            .or(self.plain_lyrics.filter(|s| !s.trim().is_empty()))
    }
}

/// LRCLIB API client
#[derive(Debug, Clone)]
pub struct LrclibProvider {
    client: reqwest::Client,
    base_url: String,
}

impl LrclibProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Provider for LrclibProvider {
    fn name(&self) -> &str {
        "lrclib"
    }

    async fn search(
        &self,
        title: &str,
        artist: &str,
        album: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let mut query = vec![("track_name", title)];
        if !artist.is_empty() {
            query.push(("artist_name", artist));
        }
        if !album.is_empty() {
            query.push(("album_name", album));
        }

        let url = format!("{}/search", self.base_url);
        tracing::debug!(url = %url, title = %title, artist = %artist, "Querying LRCLIB");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        let records: Vec<LrclibRecord> = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(records
            .into_iter()
            .filter_map(LrclibRecord::best_text)
            .collect())
    }
}
