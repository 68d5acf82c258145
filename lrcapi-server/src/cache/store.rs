//! On-disk response store
//!
//! One file per key, named by the SHA-256 of the key. Each file holds a
//! single JSON header line followed by the raw response body:
//!
//! ```text
//! {"key":"lyrics#…","created_at":"…","ttl_ms":86400000,"status":200,"content_type":"text/plain; charset=utf-8"}
//! <body bytes>
//! ```
//!
//! Writes go to a temporary file in the same directory and are renamed into
//! place, so readers never observe a partially written entry.

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

use super::CachedResponse;

const ENTRY_EXTENSION: &str = "entry";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt cache entry: {0}")]
    Corrupt(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryHeader {
    key: String,
    created_at: DateTime<Utc>,
    ttl_ms: u64,
    status: u16,
    content_type: String,
}

impl EntryHeader {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let ttl = chrono::Duration::milliseconds(self.ttl_ms.min(i64::MAX as u64) as i64);
        match self.created_at.checked_add_signed(ttl) {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

/// Persistent key/value store for cached responses
#[derive(Debug)]
pub struct DiskStore {
    dir: PathBuf,
    temp_counter: AtomicU64,
}

impl DiskStore {
    /// Open `dir`, creating it if needed and keeping existing entries
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            temp_counter: AtomicU64::new(0),
        })
    }

    /// Open `dir` after removing everything in it
    ///
    /// Cached responses do not survive a restart.
    pub fn open_fresh(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
            tracing::info!(dir = %dir.display(), "Cleared response cache");
        }
        Self::open(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir
            .join(format!("{:x}", digest))
            .with_extension(ENTRY_EXTENSION)
    }

    /// Fresh entry for `key`, if any
    ///
    /// Expired entries stay on disk until the next `save` replaces them.
    pub async fn load(&self, key: &str) -> Result<Option<CachedResponse>, StoreError> {
        let path = self.entry_path(key);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let split = raw
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| StoreError::Corrupt(format!("{}: missing header", path.display())))?;
        let header: EntryHeader = serde_json::from_slice(&raw[..split])
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?;

        if header.key != key {
            // digest collision or a stray file; treat as absent
            return Ok(None);
        }

        if !header.is_fresh(Utc::now()) {
            tracing::debug!(key, "Cache entry expired");
            return Ok(None);
        }

        Ok(Some(CachedResponse {
            status: header.status,
            content_type: header.content_type,
            body: Bytes::copy_from_slice(&raw[split + 1..]),
        }))
    }

    /// Persist `response` under `key` for `ttl`
    pub async fn save(
        &self,
        key: &str,
        response: &CachedResponse,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let header = EntryHeader {
            key: key.to_string(),
            created_at: Utc::now(),
            ttl_ms: ttl.as_millis().min(u64::MAX as u128) as u64,
            status: response.status,
            content_type: response.content_type.clone(),
        };

        let mut contents = serde_json::to_vec(&header)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        contents.push(b'\n');
        contents.extend_from_slice(&response.body);

        let target = self.entry_path(key);
        let temp = self.dir.join(format!(
            ".tmp-{}-{}",
            std::process::id(),
            self.temp_counter.fetch_add(1, Ordering::Relaxed)
        ));

        tokio::fs::write(&temp, &contents).await?;
        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        tracing::debug!(key, bytes = response.body.len(), "Stored cache entry");
        Ok(())
    }
}
