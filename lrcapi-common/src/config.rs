//! Configuration loading and precedence resolution
//!
//! Every setting is resolved independently, first non-empty value wins:
//! 1. Environment variable (highest priority)
//! 2. Command-line argument
//! 3. TOML config file (`./config/config.toml` unless overridden)
//! 4. Compiled default (fallback)
//!
//! A missing config file is created with defaults so users have something to
//! edit. A malformed file is logged and ignored.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_IP: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 28883;
pub const DEFAULT_WORKERS: usize = 32;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 86_400;
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LRCLIB_URL: &str = "https://lrclib.net/api";
pub const DEFAULT_COVER_URL: &str = "https://lrc.xms.mx/cover";

/// Default config file location, relative to the working directory
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config").join("config.toml")
}

/// On-disk TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerSection,
    pub auth: AuthSection,
    pub cache: CacheSection,
    pub providers: ProvidersSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub ip: String,
    pub port: u16,
    pub workers: usize,
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            ip: DEFAULT_IP.to_string(),
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            data_dir: PathBuf::from("data"),
            static_dir: PathBuf::from("src"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// Access token; empty disables authentication
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub dir: PathBuf,
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("lrcapi_cache"),
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersSection {
    pub timeout_secs: u64,
    pub lrclib_url: String,
    pub cover_url: String,
}

impl Default for ProvidersSection {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            lrclib_url: DEFAULT_LRCLIB_URL.to_string(),
            cover_url: DEFAULT_COVER_URL.to_string(),
        }
    }
}

/// Values given on the command line (or by any other caller-supplied layer)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub auth: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
    pub workers: Option<usize>,
}

impl Overrides {
    /// Read the `API_*` environment variables
    ///
    /// Unparseable numeric values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build overrides from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            ip: get("API_IP"),
            port: get("API_PORT").and_then(|v| parse_number(&v, "API_PORT")),
            auth: get("API_AUTH"),
            cache_dir: get("API_CACHE_DIR").map(PathBuf::from),
            data_dir: get("API_DATA_DIR").map(PathBuf::from),
            static_dir: get("API_STATIC_DIR").map(PathBuf::from),
            workers: get("API_WORKERS").and_then(|v| parse_number(&v, "API_WORKERS")),
        }
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, name: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number", name, value);
            None
        }
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub ip: String,
    pub port: u16,
    /// None disables authentication
    pub auth_token: Option<String>,
    pub cache_dir: PathBuf,
    pub cache_ttl: Duration,
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub workers: usize,
    pub provider_timeout: Duration,
    pub lrclib_url: String,
    pub cover_url: String,
}

impl Settings {
    /// Resolve settings: environment > command line > file > default
    pub fn resolve(env: &Overrides, cli: &Overrides, file: &TomlConfig) -> Self {
        let defaults = TomlConfig::default();
        let non_empty = |s: &str| Some(s.to_string()).filter(|v| !v.trim().is_empty());

        let ip = first([
            env.ip.clone(),
            cli.ip.clone(),
            non_empty(&file.server.ip),
        ])
        .unwrap_or(defaults.server.ip);

        let port = first([env.port, cli.port, Some(file.server.port).filter(|p| *p != 0)])
            .unwrap_or(DEFAULT_PORT);

        let auth_token = first([env.auth.clone(), cli.auth.clone(), non_empty(&file.auth.token)]);

        let cache_dir = first([
            env.cache_dir.clone(),
            cli.cache_dir.clone(),
            non_empty_path(&file.cache.dir),
        ])
        .unwrap_or(defaults.cache.dir);

        let data_dir = first([
            env.data_dir.clone(),
            cli.data_dir.clone(),
            non_empty_path(&file.server.data_dir),
        ])
        .unwrap_or(defaults.server.data_dir);

        let static_dir = first([
            env.static_dir.clone(),
            cli.static_dir.clone(),
            non_empty_path(&file.server.static_dir),
        ])
        .unwrap_or(defaults.server.static_dir);

        let workers = first([
            env.workers,
            cli.workers,
            Some(file.server.workers),
        ])
        .filter(|w| *w > 0)
        .unwrap_or(DEFAULT_WORKERS);

        let cache_ttl_secs = match file.cache.ttl_secs {
            0 => DEFAULT_CACHE_TTL_SECS,
            secs => secs,
        };
        let provider_timeout_secs = match file.providers.timeout_secs {
            0 => DEFAULT_PROVIDER_TIMEOUT_SECS,
            secs => secs,
        };

        Self {
            ip,
            port,
            auth_token,
            cache_dir,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            data_dir,
            static_dir,
            workers,
            provider_timeout: Duration::from_secs(provider_timeout_secs),
            lrclib_url: non_empty(&file.providers.lrclib_url)
                .unwrap_or(defaults.providers.lrclib_url),
            cover_url: non_empty(&file.providers.cover_url)
                .unwrap_or(defaults.providers.cover_url),
        }
    }

    /// Path of the user data database
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("userdata.db")
    }
}

/// First present value in priority order
fn first<T, const N: usize>(candidates: [Option<T>; N]) -> Option<T> {
    candidates.into_iter().flatten().next()
}

fn non_empty_path(path: &Path) -> Option<PathBuf> {
    Some(path.to_path_buf()).filter(|p| !p.as_os_str().is_empty())
}

/// Load the TOML config, creating a default file when none exists
///
/// Parse errors degrade to defaults with a warning instead of aborting startup.
pub fn load_or_create_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        let config = TomlConfig::default();
        write_toml_config(&config, path)?;
        info!("Created default config file: {}", path.display());
        return Ok(config);
    }

    let content = std::fs::read_to_string(path)?;
    match toml::from_str::<TomlConfig>(&content) {
        Ok(config) => {
            info!("Loaded config file: {}", path.display());
            Ok(config)
        }
        Err(e) => {
            warn!(
                "Config file {} is invalid, using defaults: {}",
                path.display(),
                e
            );
            Ok(TomlConfig::default())
        }
    }
}

/// Write a config file, creating parent directories as needed
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}
