//! Web UI routes
//!
//! The UI itself is a static bundle served from the configured directory.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
};

use crate::AppState;

const FAVICON: &str = "img/Logo_Design.svg";

/// GET /
pub async fn redirect_to_ui() -> Redirect {
    Redirect::to("/src")
}

/// GET /favicon.ico
pub async fn favicon(State(state): State<AppState>) -> Response {
    let path = state.options.static_dir.join(FAVICON);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/svg+xml")], bytes).into_response(),
        Err(e) => {
            tracing::debug!(file = %path.display(), error = %e, "Favicon unavailable");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
