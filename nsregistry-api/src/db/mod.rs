///! Database layer using SQLite
///!
///! Persists registered namespaces, grants, users and workload references.
///! `Database` implements every store trait of the registry.

pub mod grants;
pub mod migrations;
pub mod namespaces;
pub mod users;
pub mod workloads;

use chrono::{DateTime, Utc};
use nsregistry_common::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Database connection pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        // Create parent directory if needed
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if let Some(parent) = Path::new(path).parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    nsregistry_common::Error::System(format!(
                        "Failed to create DB directory: {}",
                        e
                    ))
                })?;
            }
        }

        let url = if database_url.contains('?') || database_url.contains(":memory:") {
            database_url.to_string()
        } else {
            format!("{}?mode=rwc", database_url)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&url)
            .await
            .map_err(|e| {
                nsregistry_common::Error::System(format!("Database connection failed: {}", e))
            })?;

        tracing::info!("Database connection established");

        Ok(Self { pool })
    }

    /// Private in-memory database. A single connection that never expires
    /// keeps the data alive for the lifetime of the pool.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                nsregistry_common::Error::System(format!("Database connection failed: {}", e))
            })?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection closed");
    }
}

/// Timestamps are stored as epoch milliseconds
pub(crate) fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}
