//! Upstream provider source
//!
//! Single lookups walk the providers in order and return the first hit; the
//! whole walk shares one deadline and a timeout yields nothing (no partial
//! result). Multi-result lookups query every provider concurrently, each under
//! the same deadline, and keep whatever arrived in time.

use async_trait::async_trait;
use futures::future::join_all;
use lrcapi_common::LookupRequest;
use std::sync::Arc;
use std::time::Duration;

use super::{LyricSource, SourceKind};
use crate::providers::Provider;

pub struct ProviderSource {
    providers: Vec<Arc<dyn Provider>>,
    deadline: Duration,
}

impl ProviderSource {
    pub fn new(providers: Vec<Arc<dyn Provider>>, deadline: Duration) -> Self {
        Self {
            providers,
            deadline,
        }
    }

    async fn search_one(provider: &dyn Provider, request: &LookupRequest) -> Vec<String> {
        match provider
            .search(request.title_str(), request.artist_str(), request.album_str())
            .await
        {
            Ok(candidates) => {
                tracing::debug!(
                    provider = provider.name(),
                    candidates = candidates.len(),
                    "Provider answered"
                );
                candidates
                    .into_iter()
                    .filter(|c| !c.trim().is_empty())
                    .collect()
            }
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "Provider failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl LyricSource for ProviderSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Provider
    }

    async fn first(&self, request: &LookupRequest) -> Option<String> {
        request.title.as_ref()?;

        let walk = async {
            for provider in &self.providers {
                let candidates = Self::search_one(provider.as_ref(), request).await;
                if let Some(first) = candidates.into_iter().next() {
                    return Some(first);
                }
            }
            None
        };

        match tokio::time::timeout(self.deadline, walk).await {
            Ok(found) => found,
            Err(_) => {
                tracing::warn!(
                    title = ?request.title,
                    deadline_secs = self.deadline.as_secs_f64(),
                    "Provider lookup timed out"
                );
                None
            }
        }
    }

    async fn all(&self, request: &LookupRequest) -> Vec<String> {
        if request.title.is_none() {
            return Vec::new();
        }

        let searches = self.providers.iter().map(|provider| async move {
            match tokio::time::timeout(self.deadline, Self::search_one(provider.as_ref(), request))
                .await
            {
                Ok(candidates) => candidates,
                Err(_) => {
                    tracing::warn!(provider = provider.name(), "Provider timed out");
                    Vec::new()
                }
            }
        });

        join_all(searches).await.into_iter().flatten().collect()
    }
}
