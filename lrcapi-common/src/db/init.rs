//! Database initialization and settings access

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

const COOKIE_SECRET_KEY: &str = "cookie_secret";

/// Open (creating if needed) the user data database and its schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_settings_table(&pool).await?;

    Ok(pool)
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Load the cookie signing secret, generating it on first use
pub async fn load_cookie_secret(pool: &SqlitePool) -> Result<i64> {
    let stored: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(COOKIE_SECRET_KEY)
        .fetch_optional(pool)
        .await?;

    match stored.and_then(|(value,)| value.parse::<i64>().ok()) {
        Some(secret) if secret != 0 => Ok(secret),
        _ => initialize_cookie_secret(pool).await,
    }
}

/// Generate and store a fresh non-zero cookie secret
///
/// Replacing the secret invalidates every cookie issued before.
pub async fn initialize_cookie_secret(pool: &SqlitePool) -> Result<i64> {
    use rand::Rng;

    let secret: i64 = {
        let mut rng = rand::thread_rng();
        loop {
            let val = rng.gen::<i64>();
            if val != 0 {
                break val;
            }
        }
    };

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(COOKIE_SECRET_KEY)
        .bind(secret.to_string())
        .execute(pool)
        .await?;

    info!("Generated new cookie signing secret");
    Ok(secret)
}
