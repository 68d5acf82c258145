//! lrcapi - lyrics lookup service
//!
//! Serves canonical LRC lyrics to music players from sidecar files, embedded
//! tags and upstream providers, plus tag writing and a cover-art proxy.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lrcapi_common::config::{default_config_path, load_or_create_config, Overrides, Settings};
use lrcapi_common::db::{init_database, load_cookie_secret};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lrcapi_server::api::AuthGate;
use lrcapi_server::cache::{DiskStore, ResponseCache};
use lrcapi_server::providers::{CoverClient, LrclibProvider, Provider};
use lrcapi_server::resolver::Resolver;
use lrcapi_server::tags::{LoftyTagStore, TagStore};
use lrcapi_server::{build_router, AppState, ServerOptions};

/// Command-line arguments for lrcapi
///
/// `API_*` environment variables take precedence over these flags.
#[derive(Parser, Debug)]
#[command(name = "lrcapi")]
#[command(about = "Lyrics lookup service for music players")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Access token; leaving it unset disables authentication
    #[arg(long)]
    auth: Option<String>,

    /// Address to bind
    #[arg(long)]
    ip: Option<String>,

    /// Config file (created with defaults when missing)
    #[arg(long, env = "API_CONFIG")]
    config: Option<PathBuf>,

    /// Response cache directory (cleared at startup)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Directory for the user data database
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory holding the web UI
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Maximum number of requests handled at once
    #[arg(long)]
    workers: Option<usize>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            ip: self.ip.clone(),
            port: self.port,
            auth: self.auth.clone(),
            cache_dir: self.cache_dir.clone(),
            data_dir: self.data_dir.clone(),
            static_dir: self.static_dir.clone(),
            workers: self.workers,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug {
        "lrcapi=debug,lrcapi_server=debug,lrcapi_common=debug,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting lrcapi v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let file_config = load_or_create_config(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    let settings = Settings::resolve(&Overrides::from_env(), &args.overrides(), &file_config);

    info!("Cache directory: {}", settings.cache_dir.display());
    info!("Data directory: {}", settings.data_dir.display());
    info!("Static directory: {}", settings.static_dir.display());
    info!(
        "Workers: {}, provider deadline: {}s, cache TTL: {}s",
        settings.workers,
        settings.provider_timeout.as_secs(),
        settings.cache_ttl.as_secs()
    );

    let store = DiskStore::open_fresh(&settings.cache_dir).context("Failed to prepare cache directory")?;
    let cache = ResponseCache::new(store);

    let pool = init_database(&settings.database_path())
        .await
        .context("Failed to open user data database")?;
    let cookie_secret = load_cookie_secret(&pool)
        .await
        .context("Failed to load cookie secret")?;

    let auth = AuthGate::new(settings.auth_token.clone(), cookie_secret);
    if auth.is_enabled() {
        info!("✓ API authentication enabled");
    } else {
        warn!("No access token configured: lookups are open and tag writes are refused");
    }

    let providers: Vec<Arc<dyn Provider>> = vec![Arc::new(
        LrclibProvider::new(&settings.lrclib_url).context("Failed to build LRCLIB client")?,
    )];
    let cover = CoverClient::new(&settings.cover_url).context("Failed to build cover client")?;
    let tags: Arc<dyn TagStore> = Arc::new(LoftyTagStore::new());
    let resolver = Resolver::standard(Arc::clone(&tags), providers, settings.provider_timeout);

    let state = AppState::new(
        resolver,
        cache,
        tags,
        cover,
        auth,
        ServerOptions {
            static_dir: settings.static_dir.clone(),
            cache_ttl: settings.cache_ttl,
            max_concurrent_requests: settings.workers,
        },
    );
    let app = build_router(state);

    let addr = bind_address(&settings.ip, settings.port)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("lrcapi listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
/// Socket address for `ip` (IPv4, IPv6, optionally bracketed) and `port`
fn bind_address(ip: &str, port: u16) -> Result<SocketAddr> {
    let host = ip.trim_start_matches('[').trim_end_matches(']');
    let ip: IpAddr = host
        .parse()
        .with_context(|| format!("Invalid bind address {}", ip))?;
    Ok(SocketAddr::new(ip, port))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
