//! `SQLite` connection pool and configuration.
//!
//! Uses [`sqlx`] with runtime query construction (not compile-time checked)
//! so no live database is needed at build time. All queries are
//! parameterized.

use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::DbError;

/// Default maximum number of connections in the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default connection acquire timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default idle timeout in seconds.
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// URL of a private in-memory database.
const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Configuration for the `SQLite` connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL.
    ///
    /// Format: `sqlite://path/to/roster.db` or `sqlite::memory:`.
    pub url: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Connection acquire timeout.
    pub connect_timeout: Duration,
    /// Idle connection timeout. `None` keeps connections open forever.
    pub idle_timeout: Option<Duration>,
}

impl DatabaseConfig {
    /// Create a new configuration from a database URL.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)),
        }
    }

    /// Configuration for a throwaway in-memory database.
    ///
    /// Every `SQLite` in-memory connection is its own database, so the
    /// pool is pinned to a single connection that never idles out.
    pub fn in_memory() -> Self {
        Self {
            url: IN_MEMORY_URL.to_owned(),
            max_connections: 1,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: None,
        }
    }

    /// Set the maximum number of connections.
    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the connection acquire timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

/// Connection pool handle to the `SQLite` database.
///
/// Wraps a [`sqlx::SqlitePool`]; the stores borrow it.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database described by `config`, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed and
    /// [`DbError::Sqlite`] if the connection fails.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        let connect_options: SqliteConnectOptions = config
            .url
            .parse()
            .map_err(|e: sqlx::Error| DbError::Config(format!("Invalid database URL: {e}")))?;
        let connect_options = connect_options
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);
        if config.is_in_memory() {
            pool_options = pool_options.min_connections(1).max_lifetime(None);
        }

        let pool = pool_options.connect_with(connect_options).await?;

        tracing::info!(
            url = %config.url,
            max_connections = config.max_connections,
            "Connected to SQLite"
        );

        Ok(Self { pool })
    }

    /// Connect using a database URL string with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection fails.
    pub async fn connect_url(url: &str) -> Result<Self, DbError> {
        Self::connect(&DatabaseConfig::new(url)).await
    }

    /// Open a fresh in-memory database with all migrations applied.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or a migration fails.
    pub async fn in_memory() -> Result<Self, DbError> {
        let db = Self::connect(&DatabaseConfig::in_memory()).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run all pending migrations from the `migrations/` directory.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Migration`] if any migration fails.
    pub async fn run_migrations(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    /// Return a reference to the underlying [`SqlitePool`].
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all connections in the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("SQLite pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_config_pins_one_connection() {
        let config = DatabaseConfig::in_memory();
        assert_eq!(config.max_connections, 1);
        assert!(config.idle_timeout.is_none());
        assert!(config.is_in_memory());
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = DatabaseConfig::new("sqlite://roster.db")
            .with_max_connections(2)
            .with_connect_timeout(Duration::from_secs(1));
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert!(!config.is_in_memory());
    }

    #[tokio::test]
    async fn fails_when_directory_is_missing() {
        let config = DatabaseConfig::new("sqlite:///roster-missing-dir/nested/roster.db")
            .with_connect_timeout(Duration::from_secs(1));
        assert!(Database::connect(&config).await.is_err());
    }
}
