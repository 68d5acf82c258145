//! Embedded tag access
//!
//! Reads and writes title/artist/album/lyrics tags using lofty. Access to a
//! given file is serialized in-process: readers of one path share a lock,
//! writers hold it exclusively. lofty is blocking, so the work runs on the
//! blocking pool.

use async_trait::async_trait;
use lofty::config::WriteOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;
use lrcapi_common::api::TagFields;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::RwLock;

/// Tag read/write errors
#[derive(Debug, Error)]
pub enum TagError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read tags: {0}")]
    Read(String),

    /// Lyrics could not be written (tag format or I/O)
    #[error("Failed to write lyrics: {0}")]
    LyricsFailed(String),

    /// Title/artist/album could not be written
    #[error("Failed to write tags: {0}")]
    TagsFailed(String),
}

/// Tags read from an audio file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub lyrics: Option<String>,
}

/// Embedded tag storage capability
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn read(&self, path: &Path) -> Result<TrackTags, TagError>;

    /// Write the fields that are set; lyrics are written before the other tags
    async fn write(&self, path: &Path, fields: &TagFields) -> Result<(), TagError>;
}

/// Per-path read/write locks
#[derive(Debug, Default)]
pub struct PathLocks {
    locks: Mutex<HashMap<PathBuf, Arc<RwLock<()>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock guarding `path`, shared by every caller touching the same file
    pub fn lock_for(&self, path: &Path) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // drop locks nobody holds any more
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }

    /// Number of tracked paths
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// lofty-backed tag store
#[derive(Debug, Default)]
pub struct LoftyTagStore {
    locks: PathLocks,
}

impl LoftyTagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TagStore for LoftyTagStore {
    async fn read(&self, path: &Path) -> Result<TrackTags, TagError> {
        let lock = self.locks.lock_for(path);
        let _guard = lock.read().await;

        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || read_tags(&path))
            .await
            .map_err(|e| TagError::Read(e.to_string()))?
    }

    async fn write(&self, path: &Path, fields: &TagFields) -> Result<(), TagError> {
        let lock = self.locks.lock_for(path);
        let _guard = lock.write().await;

        let path = path.to_path_buf();
        let fields = fields.clone();
        tokio::task::spawn_blocking(move || write_tags(&path, &fields))
            .await
            .map_err(|e| TagError::TagsFailed(e.to_string()))?
    }
}

fn read_tags(path: &Path) -> Result<TrackTags, TagError> {
    if !path.is_file() {
        return Err(TagError::FileNotFound(path.to_path_buf()));
    }

    let tagged_file = Probe::open(path)
        .and_then(|probe| probe.read())
        .map_err(|e| TagError::Read(e.to_string()))?;

    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        return Ok(TrackTags::default());
    };

    let tags = TrackTags {
        title: tag.title().map(|s| s.to_string()),
        artist: tag.artist().map(|s| s.to_string()),
        album: tag.album().map(|s| s.to_string()),
        lyrics: tag.get_string(&ItemKey::Lyrics).map(str::to_string),
    };

    tracing::debug!(
        file = %path.display(),
        title = ?tags.title,
        has_lyrics = tags.lyrics.is_some(),
        "Read embedded tags"
    );

    Ok(tags)
}

fn write_tags(path: &Path, fields: &TagFields) -> Result<(), TagError> {
    if !path.is_file() {
        return Err(TagError::FileNotFound(path.to_path_buf()));
    }

    let open_failure = |e: lofty::error::LoftyError| {
        if fields.lyrics.is_some() {
            TagError::LyricsFailed(e.to_string())
        } else {
            TagError::TagsFailed(e.to_string())
        }
    };

    let mut tagged_file = Probe::open(path)
        .and_then(|probe| probe.read())
        .map_err(open_failure)?;

    if tagged_file.primary_tag().is_none() {
        let tag_type = tagged_file.primary_tag_type();
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    let Some(tag) = tagged_file.primary_tag_mut() else {
        return Err(TagError::TagsFailed("file has no writable tag".to_string()));
    };

    if let Some(lyrics) = &fields.lyrics {
        if !tag.insert_text(ItemKey::Lyrics, lyrics.clone()) {
            return Err(TagError::LyricsFailed(format!(
                "{:?} tags cannot hold lyrics",
                tag.tag_type()
            )));
        }
        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| TagError::LyricsFailed(e.to_string()))?;
    }

    if fields.has_text_fields() {
        if let Some(title) = &fields.title {
            tag.set_title(title.clone());
        }
        if let Some(artist) = &fields.artist {
            tag.set_artist(artist.clone());
        }
        if let Some(album) = &fields.album {
            tag.set_album(album.clone());
        }
        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| TagError::TagsFailed(e.to_string()))?;
    }

    tracing::info!(file = %path.display(), "Wrote embedded tags");
    Ok(())
}
