//! Embedded tag lyrics source

use async_trait::async_trait;
use lrcapi_common::LookupRequest;
use std::sync::Arc;

use super::{LyricSource, SourceKind};
use crate::tags::TagStore;

/// Lyrics stored in the audio file's own tags
pub struct EmbeddedTagSource {
    tag_store: Arc<dyn TagStore>,
}

impl EmbeddedTagSource {
    pub fn new(tag_store: Arc<dyn TagStore>) -> Self {
        Self { tag_store }
    }
}

#[async_trait]
impl LyricSource for EmbeddedTagSource {
    fn kind(&self) -> SourceKind {
        SourceKind::EmbeddedTag
    }

    async fn first(&self, request: &LookupRequest) -> Option<String> {
        let path = request.path.as_deref()?;
        match self.tag_store.read(path).await {
            Ok(tags) => tags.lyrics.filter(|l| !l.trim().is_empty()),
            Err(e) => {
                tracing::debug!(file = %path.display(), error = %e, "No embedded lyrics");
                None
            }
        }
    }

    /// Embedded tags only take part in single lookups
    async fn all(&self, _request: &LookupRequest) -> Vec<String> {
        Vec::new()
    }
}
