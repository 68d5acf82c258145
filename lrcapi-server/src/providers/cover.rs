//! Cover-art proxy client
//!
//! Forwards the caller's query string to the configured cover upstream and
//! returns the final image after redirects.

use reqwest::redirect::Policy;
use std::time::Duration;

use super::ProviderError;

const MAX_REDIRECTS: usize = 10;

/// Image bytes with their declared content type
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// HTTP client for the cover upstream
#[derive(Debug, Clone)]
pub struct CoverClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoverClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Upstream URL for a raw query string
    pub fn url_for(&self, raw_query: Option<&str>) -> String {
        match raw_query.filter(|q| !q.is_empty()) {
            Some(query) => format!("{}?{}", self.base_url, query),
            None => self.base_url.clone(),
        }
    }

    /// Fetch the cover for a raw (still encoded) query string
    pub async fn fetch(&self, raw_query: Option<&str>) -> Result<CoverImage, ProviderError> {
        let url = self.url_for(raw_query);
        tracing::debug!(url = %url, "Fetching cover art");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api(status.as_u16(), url));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(CoverImage {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}
