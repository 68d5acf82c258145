//! Test doubles shared by the lrcapi-server integration tests
//!
//! - CountingProvider: scripted provider that records how often it was called
//! - MemoryTagStore: in-memory tag store with optional scripted write failures
//! - test_state: AppState wired to the doubles and a scratch cache directory

#![allow(dead_code)]

use async_trait::async_trait;
use lrcapi_common::api::TagFields;
use lrcapi_server::api::AuthGate;
use lrcapi_server::cache::{DiskStore, ResponseCache};
use lrcapi_server::providers::{CoverClient, Provider, ProviderError};
use lrcapi_server::resolver::Resolver;
use lrcapi_server::tags::{TagError, TagStore, TrackTags};
use lrcapi_server::{AppState, ServerOptions};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Scripted lyric provider
pub struct CountingProvider {
    name: String,
    calls: AtomicUsize,
    delay: Duration,
    response: Result<Vec<String>, String>,
}

impl CountingProvider {
    pub fn returning(texts: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            name: "counting".to_string(),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            response: Ok(texts.iter().map(|t| t.to_string()).collect()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            name: "failing".to_string(),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            response: Err(message.to_string()),
        })
    }

    pub fn slow(texts: &[&str], delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name: "slow".to_string(),
            calls: AtomicUsize::new(0),
            delay,
            response: Ok(texts.iter().map(|t| t.to_string()).collect()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for CountingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        _title: &str,
        _artist: &str,
        _album: &str,
    ) -> Result<Vec<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response
            .clone()
            .map_err(ProviderError::Network)
    }
}

/// How `MemoryTagStore::write` should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    None,
    Lyrics,
    Tags,
}

/// In-memory tag store keyed by path
pub struct MemoryTagStore {
    tags: Mutex<HashMap<PathBuf, TrackTags>>,
    failure: WriteFailure,
}

impl MemoryTagStore {
    pub fn new() -> Arc<Self> {
        Self::failing_with(WriteFailure::None)
    }

    pub fn failing_with(failure: WriteFailure) -> Arc<Self> {
        Arc::new(Self {
            tags: Mutex::new(HashMap::new()),
            failure,
        })
    }

    pub fn insert(&self, path: &Path, tags: TrackTags) {
        self.tags.lock().unwrap().insert(path.to_path_buf(), tags);
    }

    pub fn get(&self, path: &Path) -> Option<TrackTags> {
        self.tags.lock().unwrap().get(path).cloned()
    }
}

#[async_trait]
impl TagStore for MemoryTagStore {
    async fn read(&self, path: &Path) -> Result<TrackTags, TagError> {
        self.get(path)
            .ok_or_else(|| TagError::FileNotFound(path.to_path_buf()))
    }

    async fn write(&self, path: &Path, fields: &TagFields) -> Result<(), TagError> {
        match self.failure {
            WriteFailure::Lyrics if fields.lyrics.is_some() => {
                return Err(TagError::LyricsFailed("scripted".to_string()))
            }
            WriteFailure::Tags if fields.has_text_fields() => {
                return Err(TagError::TagsFailed("scripted".to_string()))
            }
            _ => {}
        }

        let mut tags = self.tags.lock().unwrap();
        let entry = tags.entry(path.to_path_buf()).or_default();
        if let Some(title) = &fields.title {
            entry.title = Some(title.clone());
        }
        if let Some(artist) = &fields.artist {
            entry.artist = Some(artist.clone());
        }
        if let Some(album) = &fields.album {
            entry.album = Some(album.clone());
        }
        if let Some(lyrics) = &fields.lyrics {
            entry.lyrics = Some(lyrics.clone());
        }
        Ok(())
    }
}

/// Scratch directories backing a test `AppState`
pub struct TestEnv {
    pub dir: TempDir,
    pub state: AppState,
}

impl TestEnv {
    /// Directory for fake music files
    pub fn music_dir(&self) -> PathBuf {
        self.dir.path().join("music")
    }
}

/// AppState over the given doubles; auth enabled when `token` is set
pub fn test_state(
    token: Option<&str>,
    tags: Arc<dyn TagStore>,
    providers: Vec<Arc<dyn Provider>>,
) -> TestEnv {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("music")).unwrap();
    std::fs::create_dir_all(dir.path().join("static/img")).unwrap();
    std::fs::write(dir.path().join("static/index.html"), "<html>lrcapi</html>").unwrap();
    std::fs::write(dir.path().join("static/img/Logo_Design.svg"), "<svg/>").unwrap();

    let cache = ResponseCache::new(DiskStore::open_fresh(dir.path().join("cache")).unwrap());
    let resolver = Resolver::standard(Arc::clone(&tags), providers, Duration::from_secs(2));
    // never contacted by these tests
    let cover = CoverClient::new("http://127.0.0.1:9/cover").unwrap();

    let state = AppState::new(
        resolver,
        cache,
        tags,
        cover,
        AuthGate::new(token.map(str::to_string), 4242),
        ServerOptions {
            static_dir: dir.path().join("static"),
            cache_ttl: Duration::from_secs(60),
            max_concurrent_requests: 8,
        },
    );

    TestEnv { dir, state }
}
