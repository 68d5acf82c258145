//! Content fingerprints for normalized lyric documents
//!
//! A fingerprint is the SHA-256 of the canonical serialized text, rendered as
//! 64 lowercase hex characters. Clients use it to tell apart (and dedupe) the
//! candidates returned by the multi-result endpoint; it is an identifier, not
//! an integrity check.

use sha2::{Digest, Sha256};

use crate::lrc::LyricDocument;

/// Fingerprint of a normalized document
///
/// # Examples
///
/// ```
/// use lrcapi_common::{fingerprint, normalize};
///
/// let a = normalize("[00:01.00]Hello");
/// let b = normalize("[00:01.000]Hello\n");
/// assert_eq!(fingerprint(&a), fingerprint(&b));
/// ```
pub fn fingerprint(doc: &LyricDocument) -> String {
    fingerprint_text(doc.serialize())
}

/// Fingerprint of already-canonical text
pub fn fingerprint_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lrc::normalize;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let doc = normalize("[00:02.00]b\n[00:01.00]a");
        let first = fingerprint(&doc);
        for _ in 0..10 {
            assert_eq!(fingerprint(&doc), first);
        }
        assert_eq!(doc.fingerprint(), first);
    }

    #[test]
    fn test_fingerprint_format() {
        let hash = fingerprint_text("[00:01.00]a");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_differs_for_different_content() {
        let a = normalize("[00:01.00]Hello");
        let b = normalize("[00:01.00]Hello!");
        let c = normalize("[00:01.01]Hello");
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_empty_document_fingerprint() {
        // SHA-256 of the empty string
        assert_eq!(
            normalize("").fingerprint(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
