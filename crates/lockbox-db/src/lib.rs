//! Lockbox Database Library
//!
//! SQLite-backed implementation of the filer contract: attachment metadata
//! is recorded after a successful durable upload and resolved back to a
//! lightweight attachment before download.

pub mod filer;

pub use filer::SqliteFiler;

use lockbox_core::AppError;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

const MAX_CONNECTIONS: u32 = 5;

/// Open a connection pool against the configured database URL.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await
        .map_err(|e| AppError::Internal(format!("database connection failed: {}", e)))
}
