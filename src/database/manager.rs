use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AppConfig, DatabaseConfig, Environment};
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::repository::Store;

/// Errors from the document store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Map unique-constraint violations to `Conflict`, pool failures to
    /// `ConnectionError`, and keep everything else as-is.
    pub fn classify(err: sqlx::Error, conflict_message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::Conflict(conflict_message.to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionError(err.to_string())
            }
            _ => DatabaseError::Sqlx(err),
        }
    }
}

/// Builds the process-wide store from configuration
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the configured store. Postgres when a URL is configured, the
    /// in-memory store otherwise (refused in production).
    pub async fn open(config: &AppConfig, run_migrations: bool) -> Result<Arc<dyn Store>, DatabaseError> {
        match &config.database.url {
            Some(url) => {
                let pool = Self::connect(url, &config.database).await?;
                if run_migrations {
                    Self::migrate(&pool).await?;
                }
                Ok(Arc::new(PgStore::new(pool)))
            }
            None if config.environment == Environment::Production => {
                Err(DatabaseError::ConfigMissing("DATABASE_URL"))
            }
            None => {
                warn!("DATABASE_URL not set; using the in-memory store, data will not survive a restart");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }

    /// Create the connection pool
    pub async fn connect(url: &str, settings: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let redacted = Self::redact(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!("Connected to database: {}", redacted);
        Ok(pool)
    }

    /// Apply embedded migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Connection string without credentials, for logging
    fn redact(url: &str) -> Result<String, DatabaseError> {
        let mut parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !parsed.username().is_empty() {
            parsed
                .set_username("***")
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        if parsed.password().is_some() {
            parsed
                .set_password(Some("***"))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(parsed.into())
    }
}
