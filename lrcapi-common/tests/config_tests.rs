//! Tests for configuration loading and precedence
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate API_* variables are marked with #[serial].

use lrcapi_common::config::{
    load_or_create_config, write_toml_config, Overrides, Settings, TomlConfig, DEFAULT_PORT,
};
use serial_test::serial;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn env_from(vars: &[(&str, &str)]) -> Overrides {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Overrides::from_lookup(|name| map.get(name).cloned())
}

#[test]
fn test_defaults_without_any_source() {
    let settings = Settings::resolve(
        &Overrides::default(),
        &Overrides::default(),
        &TomlConfig::default(),
    );

    assert_eq!(settings.ip, "0.0.0.0");
    assert_eq!(settings.port, DEFAULT_PORT);
    assert_eq!(settings.auth_token, None);
    assert_eq!(settings.cache_dir, PathBuf::from("lrcapi_cache"));
    assert_eq!(settings.cache_ttl, Duration::from_secs(86_400));
    assert_eq!(settings.provider_timeout, Duration::from_secs(30));
    assert_eq!(settings.workers, 32);
    assert_eq!(settings.database_path(), PathBuf::from("data").join("userdata.db"));
}

#[test]
fn test_env_beats_cli_beats_file() {
    let mut file = TomlConfig::default();
    file.server.port = 1000;
    file.auth.token = "from-file".to_string();
    file.server.ip = "10.0.0.1".to_string();

    let cli = Overrides {
        port: Some(2000),
        auth: Some("from-cli".to_string()),
        ..Default::default()
    };
    let env = env_from(&[("API_PORT", "3000")]);

    let settings = Settings::resolve(&env, &cli, &file);
    assert_eq!(settings.port, 3000);
    assert_eq!(settings.auth_token.as_deref(), Some("from-cli"));
    assert_eq!(settings.ip, "10.0.0.1");
}

#[test]
fn test_empty_values_fall_through() {
    let mut file = TomlConfig::default();
    file.auth.token = "from-file".to_string();

    let env = env_from(&[("API_AUTH", ""), ("API_PORT", "not-a-port")]);
    let cli = Overrides {
        auth: None,
        ..Default::default()
    };

    let settings = Settings::resolve(&env, &cli, &file);
    assert_eq!(settings.auth_token.as_deref(), Some("from-file"));
    assert_eq!(settings.port, DEFAULT_PORT);
}

#[test]
fn test_empty_file_token_disables_auth() {
    let settings = Settings::resolve(
        &Overrides::default(),
        &Overrides::default(),
        &TomlConfig::default(),
    );
    assert!(settings.auth_token.is_none());
}

#[test]
fn test_missing_config_file_is_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config").join("config.toml");

    let config = load_or_create_config(&path).unwrap();
    assert_eq!(config, TomlConfig::default());
    assert!(path.exists());

    // Second load reads the file that was just written
    let reloaded = load_or_create_config(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_partial_config_file_uses_section_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server]\nport = 9999\n\n[auth]\ntoken = \"pw\"\n").unwrap();

    let config = load_or_create_config(&path).unwrap();
    assert_eq!(config.server.port, 9999);
    assert_eq!(config.server.ip, "0.0.0.0");
    assert_eq!(config.auth.token, "pw");
    assert_eq!(config.cache.ttl_secs, 86_400);
}

#[test]
fn test_malformed_config_file_degrades_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is = = not toml [").unwrap();

    let config = load_or_create_config(&path).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_write_then_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = TomlConfig::default();
    config.cache.ttl_secs = 60;
    config.providers.timeout_secs = 5;
    write_toml_config(&config, &path).unwrap();

    let settings = Settings::resolve(
        &Overrides::default(),
        &Overrides::default(),
        &load_or_create_config(&path).unwrap(),
    );
    assert_eq!(settings.cache_ttl, Duration::from_secs(60));
    assert_eq!(settings.provider_timeout, Duration::from_secs(5));
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    env::set_var("API_AUTH", "env-token");
    env::set_var("API_WORKERS", "4");

    let overrides = Overrides::from_env();
    assert_eq!(overrides.auth.as_deref(), Some("env-token"));
    assert_eq!(overrides.workers, Some(4));

    env::remove_var("API_AUTH");
    env::remove_var("API_WORKERS");
}

#[test]
#[serial]
fn test_from_env_ignores_unset_variables() {
    env::remove_var("API_AUTH");
    env::remove_var("API_PORT");

    let overrides = Overrides::from_env();
    assert!(overrides.auth.is_none());
    assert!(overrides.port.is_none());
}
