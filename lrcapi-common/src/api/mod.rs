//! API module for shared HTTP API functionality
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared request/response types
//!
//! The server wraps these with axum extractors and handlers.

pub mod auth;
pub mod types;

pub use auth::{
    check_credentials, issue_cookie_token, verify_cookie_token, AuthOutcome, Credentials,
    Permission, AUTH_COOKIE,
};
pub use types::{LoginRequest, LoginResponse, LyricCandidate, TagFields};
