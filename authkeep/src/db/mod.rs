//! Database module providing PostgreSQL connection pooling and the
//! account/session stores.
//!
//! This module manages the database connection pool using sqlx, the schema
//! migration, and the repository implementations the authentication engine
//! is built on.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::auth::StorageError;

pub mod config;
pub mod memory;
pub mod repository;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use memory::{InMemoryAccountRepository, InMemorySessionRepository};
pub use repository::{
    AccountRepository, PgAccountRepository, PgSessionRepository, SessionRepository,
};

/// Schema for the `accounts` and `refresh_sessions` tables
pub const SCHEMA: &str = include_str!("../../migrations/001_initial_schema.sql");

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Arguments
    ///
    /// * `config` - Database configuration
    ///
    /// # Returns
    ///
    /// * `Result<Database, sqlx::Error>` - Database instance or error
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use authkeep::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let config = DatabaseConfig::from_env();
    ///     let db = Database::new(&config).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables if they do not exist yet
    pub async fn migrate(&self) -> Result<(), StorageError> {
        timeouts::with_timeout(
            timeouts::LONG_OPERATION_TIMEOUT,
            sqlx::raw_sql(SCHEMA).execute(&self.pool),
        )
        .await?;
        log::info!("Database schema is up to date");
        Ok(())
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), StorageError> {
        timeouts::with_default_timeout(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
