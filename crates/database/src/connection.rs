//! Database connection management

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use swapshop_config::DatabaseConfig;
use tokio::fs;
use tracing::info;

/// Prepare and establish a database connection
pub async fn prepare_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    ensure_sqlite_path(&config.url).await?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        // Every connection needs the pragmas, not only the first one.
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON")
                    .execute(&mut *conn)
                    .await?;
                sqlx::query("PRAGMA busy_timeout = 5000")
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await
        .with_context(|| format!("failed to connect to database {}", config.url))?;

    if !is_memory_url(&config.url) {
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await
            .context("failed to enable WAL mode for sqlite")?;
    }

    info!(url = %config.url, "database connection established");
    Ok(pool)
}

fn sqlite_path(url: &str) -> Option<&str> {
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .map(|path| path.split('?').next().unwrap_or(path))
}

fn is_memory_url(url: &str) -> bool {
    sqlite_path(url).is_some_and(|path| path == ":memory:")
}

/// Ensure the SQLite database file and directory exist
async fn ensure_sqlite_path(url: &str) -> Result<()> {
    let Some(sqlite_path) = sqlite_path(url) else {
        return Ok(());
    };

    if sqlite_path == ":memory:" || sqlite_path.is_empty() {
        return Ok(());
    }

    let path = Path::new(sqlite_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create sqlite directory {}", parent.display())
            })?;
        }
    }

    if fs::metadata(path).await.is_err() {
        fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .await
            .with_context(|| format!("failed to create sqlite database file {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn creates_missing_directories_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested/dir/test.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
        };

        let pool = prepare_database(&config).await.unwrap();
        sqlx::query("SELECT 1").execute(&pool).await.unwrap();

        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn in_memory_database_connects() {
        let config = DatabaseConfig {
            url: "sqlite://:memory:".to_string(),
            max_connections: 1,
        };

        let pool = prepare_database(&config).await.unwrap();
        let foreign_keys: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(foreign_keys.0, 1);
    }

    #[test]
    fn sqlite_path_strips_scheme_and_query() {
        assert_eq!(sqlite_path("sqlite://data/app.db?mode=rwc"), Some("data/app.db"));
        assert_eq!(sqlite_path("sqlite:app.db"), Some("app.db"));
        assert_eq!(sqlite_path("postgres://localhost/app"), None);
    }
}
