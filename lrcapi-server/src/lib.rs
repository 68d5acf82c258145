//! lrcapi server library
//!
//! Lyrics lookup service for music players: resolves lyrics from a sidecar
//! `.lrc` file, the audio file's embedded tags or upstream providers, and
//! returns them in one canonical LRC form.

use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub mod api;
pub mod cache;
pub mod error;
pub mod providers;
pub mod resolver;
pub mod tags;

use api::AuthGate;
use cache::ResponseCache;
use providers::CoverClient;
use resolver::Resolver;
use tags::TagStore;

/// Server-wide knobs that handlers read
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Directory holding the static web UI
    pub static_dir: PathBuf,
    /// Lifetime of cached responses
    pub cache_ttl: Duration,
    /// Maximum number of requests handled at once
    pub max_concurrent_requests: usize,
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub cache: ResponseCache,
    pub tags: Arc<dyn TagStore>,
    pub cover: Arc<CoverClient>,
    pub auth: AuthGate,
    pub options: Arc<ServerOptions>,
}

impl AppState {
    pub fn new(
        resolver: Resolver,
        cache: ResponseCache,
        tags: Arc<dyn TagStore>,
        cover: CoverClient,
        auth: AuthGate,
        options: ServerOptions,
    ) -> Self {
        Self {
            resolver: Arc::new(resolver),
            cache,
            tags,
            cover: Arc::new(cover),
            auth,
            options: Arc::new(options),
        }
    }
}

/// Build application router
///
/// `/lyrics`, `/jsonapi` and `/tag` check credentials inside the handler;
/// everything else is public.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use tower::limit::ConcurrencyLimitLayer;
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::services::ServeDir;
    use tower_http::trace::TraceLayer;

    let api = Router::new()
        .route("/lyrics", get(api::get_lyrics))
        .route("/jsonapi", get(api::get_lyrics_json))
        .route("/cover", get(api::get_cover))
        .route("/tag", post(api::set_tag))
        .route("/login-api", post(api::login_api));

    let ui = Router::new()
        .route("/", get(api::redirect_to_ui))
        .route("/login", get(api::login_page))
        .route("/favicon.ico", get(api::favicon))
        .nest_service("/src", ServeDir::new(&state.options.static_dir))
        .merge(api::health_routes());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api)
        .merge(ui)
        .layer(cors)
        .layer(ConcurrencyLimitLayer::new(
            state.options.max_concurrent_requests.max(1),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
