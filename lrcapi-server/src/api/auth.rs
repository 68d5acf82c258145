//! Auth gate and login endpoints
//!
//! Credentials come from the `Authorization`/`Authentication` header or the
//! `api_auth_token` cookie issued by `POST /login-api`.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use lrcapi_common::api::auth::COOKIE_MAX_AGE_SECS;
use lrcapi_common::api::{
    check_credentials, issue_cookie_token, AuthOutcome, Credentials, LoginRequest, LoginResponse,
    Permission, AUTH_COOKIE,
};

use crate::error::ApiError;
use crate::AppState;

const LOGIN_HTML: &str = include_str!("../../ui/login.html");

/// Configured token plus the cookie signing secret
#[derive(Debug, Clone)]
pub struct AuthGate {
    token: Option<String>,
    cookie_secret: i64,
}

impl AuthGate {
    pub fn new(token: Option<String>, cookie_secret: i64) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            cookie_secret,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    pub fn outcome(&self, headers: &HeaderMap, permission: Permission) -> AuthOutcome {
        let header = header_str(headers, header::AUTHORIZATION.as_str())
            .or_else(|| header_str(headers, "authentication"));
        let cookie = cookie_value(headers, AUTH_COOKIE);

        check_credentials(
            self.token.as_deref(),
            self.cookie_secret,
            Credentials { header, cookie },
            permission,
        )
    }

    /// Gate a handler
    pub fn check(&self, headers: &HeaderMap, permission: Permission) -> Result<(), ApiError> {
        match self.outcome(headers, permission) {
            AuthOutcome::Authorized => Ok(()),
            AuthOutcome::Forbidden => {
                tracing::debug!("Rejected request with invalid credentials");
                Err(ApiError::Forbidden)
            }
            AuthOutcome::AuthRequired => Err(ApiError::AuthRequired),
        }
    }

    /// Signed cookie token for a successful login
    pub fn issue_cookie(&self) -> String {
        issue_cookie_token(self.cookie_secret)
    }

    fn password_matches(&self, password: Option<&str>) -> bool {
        matches!((self.token.as_deref(), password), (Some(token), Some(given)) if token == given)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Value of cookie `name` from the `Cookie` header(s)
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// GET /login
///
/// Login form when a token is configured and the caller is not yet
/// authorized; otherwise straight to the web UI.
pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if state.auth.is_enabled()
        && state.auth.outcome(&headers, Permission::Read) != AuthOutcome::Authorized
    {
        return Html(LOGIN_HTML).into_response();
    }
    Redirect::to("/src").into_response()
}

/// POST /login-api
pub async fn login_api(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Response {
    if !state.auth.password_matches(request.password.as_deref()) {
        tracing::info!("Login rejected");
        return Json(LoginResponse { success: false }).into_response();
    }

    let cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        AUTH_COOKIE,
        state.auth.issue_cookie(),
        COOKIE_MAX_AGE_SECS
    );
    tracing::info!("Login accepted, issued session cookie");

    match HeaderValue::from_str(&cookie) {
        Ok(value) => (
            StatusCode::OK,
            [(header::SET_COOKIE, value)],
            Json(LoginResponse { success: true }),
        )
            .into_response(),
        Err(e) => ApiError::Internal(e.to_string()).into_response(),
    }
}
