//! Single-user authentication
//!
//! # Model
//!
//! - One optional access token configured at startup (`--auth` / `API_AUTH`)
//! - A request is authorized when the `Authorization` (or `Authentication`)
//!   header equals the token, or when it carries a valid `api_auth_token` cookie
//! - Cookies are issued by the login endpoint and signed with a server-side
//!   secret: `<issued_at>.<sha256(issued_at || secret)>`
//! - Without a configured token, read endpoints are open and write endpoints
//!   answer "auth required"
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies; the server extracts headers and cookies.

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Cookie carrying the signed session token
pub const AUTH_COOKIE: &str = "api_auth_token";

/// Cookie lifetime (30 days)
pub const COOKIE_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Result of checking a request against the auth gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authorized,
    /// Token configured but credentials missing or wrong (403)
    Forbidden,
    /// Endpoint needs auth but no token is configured (421)
    AuthRequired,
}

/// Permission level an endpoint demands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Lookup endpoints: open when no token is configured
    Read,
    /// Mutating endpoints: refused when no token is configured
    Write,
}

/// Credentials presented by a request
#[derive(Debug, Clone, Copy, Default)]
pub struct Credentials<'a> {
    /// `Authorization` or `Authentication` header value
    pub header: Option<&'a str>,
    /// `api_auth_token` cookie value
    pub cookie: Option<&'a str>,
}

/// Decide whether a request may proceed
///
/// # Examples
///
/// ```
/// use lrcapi_common::api::auth::{check_credentials, AuthOutcome, Credentials, Permission};
///
/// let creds = Credentials { header: Some("secret"), cookie: None };
/// assert_eq!(check_credentials(Some("secret"), 42, creds, Permission::Write), AuthOutcome::Authorized);
/// assert_eq!(check_credentials(None, 42, creds, Permission::Write), AuthOutcome::AuthRequired);
/// assert_eq!(check_credentials(None, 42, creds, Permission::Read), AuthOutcome::Authorized);
/// ```
pub fn check_credentials(
    token: Option<&str>,
    cookie_secret: i64,
    credentials: Credentials<'_>,
    permission: Permission,
) -> AuthOutcome {
    match token {
        Some(token) => {
            let header_ok = credentials.header.is_some_and(|h| h == token);
            let cookie_ok = credentials
                .cookie
                .is_some_and(|c| verify_cookie_token(c, cookie_secret));
            if header_ok || cookie_ok {
                AuthOutcome::Authorized
            } else {
                AuthOutcome::Forbidden
            }
        }
        None => match permission {
            Permission::Read => AuthOutcome::Authorized,
            Permission::Write => AuthOutcome::AuthRequired,
        },
    }
}

/// Issue a signed cookie token valid from now
pub fn issue_cookie_token(cookie_secret: i64) -> String {
    issue_cookie_token_at(cookie_secret, now_secs())
}

/// Issue a signed cookie token with an explicit issue time (unix seconds)
pub fn issue_cookie_token_at(cookie_secret: i64, issued_at: i64) -> String {
    format!("{}.{}", issued_at, sign(issued_at, cookie_secret))
}

/// Verify signature and age of a cookie token
pub fn verify_cookie_token(token: &str, cookie_secret: i64) -> bool {
    verify_cookie_token_at(token, cookie_secret, now_secs())
}

/// Verify a cookie token against an explicit clock (unix seconds)
pub fn verify_cookie_token_at(token: &str, cookie_secret: i64, now: i64) -> bool {
    let Some((issued_at, signature)) = token.split_once('.') else {
        return false;
    };
    let Ok(issued_at) = issued_at.parse::<i64>() else {
        return false;
    };

    let Some(age) = now.checked_sub(issued_at) else {
        return false;
    };
    if !(0..=COOKIE_MAX_AGE_SECS).contains(&age) {
        return false;
    }

    sign(issued_at, cookie_secret) == signature
}

fn sign(issued_at: i64, cookie_secret: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}{}", issued_at, cookie_secret).as_bytes());
    format!("{:x}", hasher.finalize())
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
