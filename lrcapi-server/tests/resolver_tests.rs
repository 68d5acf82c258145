//! Resolver integration tests
//!
//! Source priority, fallbacks, provider failure handling and deadlines.

mod helpers;

use helpers::{CountingProvider, MemoryTagStore};
use lrcapi_common::LookupRequest;
use lrcapi_server::providers::Provider;
use lrcapi_server::resolver::{ResolveError, Resolver, SourceKind};
use lrcapi_server::tags::{TagStore, TrackTags};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn lookup(path: Option<PathBuf>, title: Option<&str>) -> LookupRequest {
    LookupRequest {
        path,
        title: title.map(str::to_string),
        artist: Some("Artist".to_string()),
        album: None,
    }
}

fn resolver_with(
    tags: Arc<MemoryTagStore>,
    providers: Vec<Arc<CountingProvider>>,
    deadline: Duration,
) -> Resolver {
    let providers: Vec<Arc<dyn Provider>> = providers
        .into_iter()
        .map(|p| p as Arc<dyn Provider>)
        .collect();
    Resolver::standard(tags as Arc<dyn TagStore>, providers, deadline)
}

#[tokio::test]
async fn test_sidecar_wins_over_provider() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("song.lrc"), "[00:02.00]from sidecar").unwrap();
    let provider = CountingProvider::returning(&["[00:01.00]from provider"]);
    let resolver = resolver_with(
        MemoryTagStore::new(),
        vec![Arc::clone(&provider)],
        Duration::from_secs(1),
    );

    let result = resolver
        .resolve_single(&lookup(Some(dir.path().join("song.mp3")), Some("Song")))
        .await
        .unwrap();

    assert_eq!(result.source, SourceKind::Sidecar);
    assert_eq!(result.document.serialize(), "[00:02.00]from sidecar");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_sidecar_is_normalized() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("song.lrc"),
        "[00:01.00]La la\r\n[00:00.50]Intro\r\n",
    )
    .unwrap();
    let resolver = resolver_with(MemoryTagStore::new(), vec![], Duration::from_secs(1));

    let result = resolver
        .resolve_single(&lookup(Some(dir.path().join("song.flac")), None))
        .await
        .unwrap();

    assert_eq!(result.document.serialize(), "[00:00.50]Intro\n[00:01.00]La la");
}

#[tokio::test]
async fn test_embedded_tag_used_without_sidecar() {
    let dir = TempDir::new().unwrap();
    let audio = dir.path().join("song.mp3");
    let tags = MemoryTagStore::new();
    tags.insert(
        &audio,
        TrackTags {
            lyrics: Some("[00:03.00]embedded".to_string()),
            ..Default::default()
        },
    );
    let provider = CountingProvider::returning(&["[00:01.00]from provider"]);
    let resolver = resolver_with(tags, vec![Arc::clone(&provider)], Duration::from_secs(1));

    let result = resolver
        .resolve_single(&lookup(Some(audio), Some("Song")))
        .await
        .unwrap();

    assert_eq!(result.source, SourceKind::EmbeddedTag);
    assert_eq!(result.document.serialize(), "[00:03.00]embedded");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_provider_fallback_by_title() {
    let provider = CountingProvider::returning(&["[00:10.00]b\n[00:05.00]a"]);
    let resolver = resolver_with(
        MemoryTagStore::new(),
        vec![Arc::clone(&provider)],
        Duration::from_secs(1),
    );

    let result = resolver
        .resolve_single(&lookup(None, Some("Song")))
        .await
        .unwrap();

    assert_eq!(result.source, SourceKind::Provider);
    assert_eq!(result.document.serialize(), "[00:05.00]a\n[00:10.00]b");
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_failing_provider_is_skipped() {
    let broken = CountingProvider::failing("connection refused");
    let working = CountingProvider::returning(&["[00:01.00]ok"]);
    let resolver = resolver_with(
        MemoryTagStore::new(),
        vec![Arc::clone(&broken), Arc::clone(&working)],
        Duration::from_secs(1),
    );

    let result = resolver
        .resolve_single(&lookup(None, Some("Song")))
        .await
        .unwrap();

    assert_eq!(result.document.serialize(), "[00:01.00]ok");
    assert_eq!(broken.calls(), 1);
    assert_eq!(working.calls(), 1);
}

#[tokio::test]
async fn test_no_source_is_not_found() {
    let dir = TempDir::new().unwrap();
    let provider = CountingProvider::returning(&[]);
    let resolver = resolver_with(
        MemoryTagStore::new(),
        vec![provider],
        Duration::from_secs(1),
    );

    let err = resolver
        .resolve_single(&lookup(Some(dir.path().join("missing.mp3")), Some("Song")))
        .await
        .unwrap_err();
    assert_eq!(err, ResolveError::NotFound);
}

#[tokio::test]
async fn test_provider_deadline_is_not_found() {
    let slow = CountingProvider::slow(&["[00:01.00]late"], Duration::from_millis(500));
    let resolver = resolver_with(
        MemoryTagStore::new(),
        vec![Arc::clone(&slow)],
        Duration::from_millis(50),
    );

    let started = std::time::Instant::now();
    let err = resolver
        .resolve_single(&lookup(None, Some("Song")))
        .await
        .unwrap_err();

    assert_eq!(err, ResolveError::NotFound);
    assert!(started.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn test_missing_path_and_title_is_invalid() {
    let resolver = resolver_with(MemoryTagStore::new(), vec![], Duration::from_secs(1));
    let request = LookupRequest {
        artist: Some("Artist".to_string()),
        ..Default::default()
    };

    assert!(matches!(
        resolver.resolve_single(&request).await,
        Err(ResolveError::InvalidRequest(_))
    ));
    assert!(matches!(
        resolver.resolve_all(&request).await,
        Err(ResolveError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn test_resolve_all_orders_sidecar_then_providers() {
    let dir = TempDir::new().unwrap();
    let audio = dir.path().join("song.mp3");
    std::fs::write(dir.path().join("song.lrc"), "[00:01.00]sidecar").unwrap();

    let tags = MemoryTagStore::new();
    tags.insert(
        &audio,
        TrackTags {
            lyrics: Some("[00:01.00]embedded".to_string()),
            ..Default::default()
        },
    );
    let first = CountingProvider::returning(&["[00:01.00]p1", "[00:01.00]p2"]);
    let second = CountingProvider::returning(&["[00:01.00]p3"]);
    let resolver = resolver_with(tags, vec![first, second], Duration::from_secs(1));

    let results = resolver
        .resolve_all(&lookup(Some(audio), Some("Song")))
        .await
        .unwrap();

    let texts: Vec<&str> = results.iter().map(|r| r.document.serialize()).collect();
    assert_eq!(
        texts,
        vec![
            "[00:01.00]sidecar",
            "[00:01.00]p1",
            "[00:01.00]p2",
            "[00:01.00]p3"
        ]
    );
    assert_eq!(results[0].source, SourceKind::Sidecar);
    assert!(results[1..].iter().all(|r| r.source == SourceKind::Provider));
}

#[tokio::test]
async fn test_resolve_all_keeps_timely_providers() {
    let fast = CountingProvider::returning(&["[00:01.00]fast"]);
    let slow = CountingProvider::slow(&["[00:01.00]slow"], Duration::from_millis(500));
    let resolver = resolver_with(
        MemoryTagStore::new(),
        vec![slow, fast],
        Duration::from_millis(50),
    );

    let results = resolver
        .resolve_all(&lookup(None, Some("Song")))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.serialize(), "[00:01.00]fast");
}
