//! # LRCAPI Common Library
//!
//! Shared code for the lyrics service:
//! - LRC normalization into the canonical timed-lyric form
//! - Content fingerprints for normalized documents
//! - Lookup requests and cache key derivation
//! - Cookie token signing for the single-user auth gate
//! - Configuration loading and precedence resolution
//! - User data database (settings table)

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod fingerprint;
pub mod lookup;
pub mod lrc;

pub use error::{Error, Result};
pub use fingerprint::fingerprint;
pub use lookup::{cache_key, LookupRequest};
pub use lrc::{normalize, LyricDocument, TimedLyricLine};
