//! Multi-source lyric resolution
//!
//! A [`Resolver`] owns an ordered list of [`LyricSource`] strategies. The
//! standard order is:
//!
//! 1. Sidecar `.lrc` file next to the audio file
//! 2. Lyrics embedded in the audio file's tags
//! 3. Upstream providers (bounded by a fixed deadline)
//!
//! `resolve_single` stops at the first source yielding text. `resolve_all`
//! asks every source for its full candidate list and concatenates them in
//! source order; candidates are not deduplicated.
//!
//! Sources never fail: a broken file, an undecodable sidecar or a provider
//! error is logged inside the source and reported as "nothing found".

pub mod embedded;
pub mod providers;
pub mod sidecar;

use async_trait::async_trait;
use lrcapi_common::lrc::{normalize, LyricDocument};
use lrcapi_common::LookupRequest;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::providers::Provider;
use crate::tags::TagStore;

pub use embedded::EmbeddedTagSource;
pub use providers::ProviderSource;
pub use sidecar::SidecarSource;

/// Where a resolved document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Sidecar,
    EmbeddedTag,
    Provider,
}

/// A normalized document tagged with its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    pub document: LyricDocument,
    pub source: SourceKind,
}

/// Resolution errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Neither path nor title supplied
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No source produced lyrics (includes provider timeouts)
    #[error("Lyrics not found")]
    NotFound,
}

/// One resolution strategy
#[async_trait]
pub trait LyricSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// First raw lyric text this source can offer
    async fn first(&self, request: &LookupRequest) -> Option<String>;

    /// Every raw lyric text this source can offer, for the multi-result lookup
    async fn all(&self, request: &LookupRequest) -> Vec<String>;
}

/// Ordered chain of lyric sources
#[derive(Clone)]
pub struct Resolver {
    sources: Vec<Arc<dyn LyricSource>>,
}

impl Resolver {
    pub fn new(sources: Vec<Arc<dyn LyricSource>>) -> Self {
        Self { sources }
    }

    /// Sidecar, then embedded tags, then providers under `provider_deadline`
    pub fn standard(
        tag_store: Arc<dyn TagStore>,
        providers: Vec<Arc<dyn Provider>>,
        provider_deadline: Duration,
    ) -> Self {
        Self::new(vec![
            Arc::new(SidecarSource::new()),
            Arc::new(EmbeddedTagSource::new(tag_store)),
            Arc::new(ProviderSource::new(providers, provider_deadline)),
        ])
    }

    /// Resolve to the highest-priority available document
    pub async fn resolve_single(
        &self,
        request: &LookupRequest,
    ) -> Result<ResolutionResult, ResolveError> {
        validate(request)?;

        for source in &self.sources {
            if let Some(raw) = source.first(request).await {
                let source = source.kind();
                tracing::debug!(source = ?source, "Lyrics resolved");
                return Ok(ResolutionResult {
                    document: normalize(&raw),
                    source,
                });
            }
        }

        tracing::debug!(
            path = ?request.path,
            title = ?request.title,
            "No source produced lyrics"
        );
        Err(ResolveError::NotFound)
    }

    /// Collect every candidate from every source, in source order
    pub async fn resolve_all(
        &self,
        request: &LookupRequest,
    ) -> Result<Vec<ResolutionResult>, ResolveError> {
        validate(request)?;

        let mut results = Vec::new();
        for source in &self.sources {
            let kind = source.kind();
            results.extend(
                source
                    .all(request)
                    .await
                    .into_iter()
                    .map(|raw| ResolutionResult {
                        document: normalize(&raw),
                        source: kind,
                    }),
            );
        }

        tracing::debug!(candidates = results.len(), "Collected lyric candidates");
        Ok(results)
    }
}

fn validate(request: &LookupRequest) -> Result<(), ResolveError> {
    request
        .validate()
        .map_err(|e| ResolveError::InvalidRequest(e.to_string()))
}
