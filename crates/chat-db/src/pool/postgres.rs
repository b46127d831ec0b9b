//! PostgreSQL connection pool and schema migrations

use std::path::Path;
use std::time::Duration;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

/// Connection pool settings
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Maximum time to wait for a connection
    pub acquire_timeout: Duration,
    /// Maximum idle time before a connection is closed
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl PoolConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }

    /// Pool settings from the application config; `None` when no URL is set
    pub fn from_app(config: &chat_common::DatabaseConfig) -> Option<Self> {
        let url = config.url.as_deref()?;
        Some(Self {
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            ..Self::new(url)
        })
    }
}

/// Create a new PostgreSQL connection pool
pub async fn create_pool(config: &PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.url)
        .await
}

/// Apply the SQL migrations found in `dir`
pub async fn run_migrations(pool: &PgPool, dir: &Path) -> Result<(), MigrateError> {
    let migrator = Migrator::new(dir).await?;
    migrator.run(pool).await?;
    info!(dir = %dir.display(), count = migrator.iter().count(), "Database migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_common::{DatabaseBackend, DatabaseConfig};

    fn app_config(url: Option<&str>) -> DatabaseConfig {
        DatabaseConfig {
            backend: DatabaseBackend::Postgres,
            url: url.map(String::from),
            max_connections: 20,
            min_connections: 5,
            run_migrations: false,
            migrations_dir: "./migrations".to_string(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = PoolConfig::new("postgres://localhost/chat");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_from_app_config() {
        let config = PoolConfig::from_app(&app_config(Some("postgres://db/chat"))).unwrap();
        assert_eq!(config.url, "postgres://db/chat");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);

        assert!(PoolConfig::from_app(&app_config(None)).is_none());
    }
}
