//! Swapshop database crate
//!
//! Connection preparation and the embedded schema migrations. Queries live
//! next to the services that issue them.

use sqlx::SqlitePool;
use swapshop_config::DatabaseConfig;
use thiserror::Error;

pub mod connection;
pub mod migrations;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("database migration error: {0}")]
    Migration(String),
}

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::Connection(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(format!("{e:#}")))?;

    Ok(pool)
}
