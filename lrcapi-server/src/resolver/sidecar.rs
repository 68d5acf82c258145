//! Sidecar `.lrc` source
//!
//! The sidecar is trusted unconditionally once it decodes: whatever text it
//! holds is returned, even if it contains no timestamps.

use async_trait::async_trait;
use encoding_rs::{Encoding, GBK, UTF_8};
use lrcapi_common::LookupRequest;
use std::path::Path;

use super::{LyricSource, SourceKind};

/// Reads `<audio file stem>.lrc`
pub struct SidecarSource {
    encodings: Vec<&'static Encoding>,
}

impl SidecarSource {
    /// UTF-8 first, then GBK
    pub fn new() -> Self {
        Self::with_encodings(vec![UTF_8, GBK])
    }

    pub fn with_encodings(encodings: Vec<&'static Encoding>) -> Self {
        Self { encodings }
    }

    async fn read(&self, request: &LookupRequest) -> Option<String> {
        let sidecar = request.sidecar_path()?;
        let bytes = match tokio::fs::read(&sidecar).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(file = %sidecar.display(), error = %e, "Failed to read sidecar");
                return None;
            }
        };
        decode_with(&self.encodings, &bytes, &sidecar)
    }
}

impl Default for SidecarSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode with the first encoding that accepts the bytes without replacement
pub fn decode_with(encodings: &[&'static Encoding], bytes: &[u8], file: &Path) -> Option<String> {
    for encoding in encodings {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            tracing::debug!(file = %file.display(), encoding = encoding.name(), "Decoded sidecar");
            return Some(text.into_owned());
        }
    }

    tracing::warn!(
        file = %file.display(),
        "Sidecar could not be decoded with any known encoding, ignoring it"
    );
    None
}

#[async_trait]
impl LyricSource for SidecarSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Sidecar
    }

    async fn first(&self, request: &LookupRequest) -> Option<String> {
        self.read(request).await
    }

    async fn all(&self, request: &LookupRequest) -> Vec<String> {
        self.read(request).await.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn request_for(path: PathBuf) -> LookupRequest {
        LookupRequest {
            path: Some(path),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_reads_utf8_sidecar() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("song.lrc"), "[00:01.00]héllo").unwrap();

        let source = SidecarSource::new();
        let text = source.first(&request_for(dir.path().join("song.mp3"))).await;
        assert_eq!(text.as_deref(), Some("[00:01.00]héllo"));
    }

    #[tokio::test]
    async fn test_reads_gbk_sidecar() {
        let dir = TempDir::new().unwrap();
        let (encoded, _, _) = GBK.encode("[00:01.00]你好世界");
        std::fs::write(dir.path().join("song.lrc"), &encoded).unwrap();

        let source = SidecarSource::new();
        let text = source.first(&request_for(dir.path().join("song.flac"))).await;
        assert_eq!(text.as_deref(), Some("[00:01.00]你好世界"));
    }

    #[tokio::test]
    async fn test_undecodable_sidecar_is_absent() {
        let dir = TempDir::new().unwrap();
        // invalid UTF-8 and an invalid GBK lead byte sequence
        std::fs::write(dir.path().join("song.lrc"), [0xff, 0xff, 0xff]).unwrap();

        let source = SidecarSource::new();
        assert_eq!(source.first(&request_for(dir.path().join("song.mp3"))).await, None);
        assert!(source.all(&request_for(dir.path().join("song.mp3"))).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_sidecar_or_path() {
        let dir = TempDir::new().unwrap();
        let source = SidecarSource::new();
        assert_eq!(source.first(&request_for(dir.path().join("none.mp3"))).await, None);

        let no_path = LookupRequest {
            title: Some("Song".to_string()),
            ..Default::default()
        };
        assert_eq!(source.first(&no_path).await, None);
    }

    #[tokio::test]
    async fn test_untimed_sidecar_is_still_trusted() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("song.lrc"), "just some words").unwrap();

        let source = SidecarSource::new();
        let text = source.first(&request_for(dir.path().join("song.mp3"))).await;
        assert_eq!(text.as_deref(), Some("just some words"));
    }
}
