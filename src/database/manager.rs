use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, StoreBackend};
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::store::JournalStore;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds connection pools and picks the journal store backend
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a PostgreSQL pool according to the database config
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let mut options =
            PgConnectOptions::from_str(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !config.enable_query_logging {
            options = options.disable_statement_logging();
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(options)
            .await?;

        info!("Created database pool for: {}", Self::redact_url(url)?);
        Ok(pool)
    }

    /// Open the configured journal store. Postgres stores get their schema
    /// created before being handed out.
    pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn JournalStore>, DatabaseError> {
        match config.backend {
            StoreBackend::Postgres => {
                let pool = Self::connect(config).await?;
                let store = PgStore::new(pool);
                store.ensure_schema().await?;
                Ok(Arc::new(store))
            }
            StoreBackend::Memory => {
                warn!("Using in-memory journal store; data is lost on restart");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }

    /// Strip credentials from a database URL so it can be logged
    pub fn redact_url(raw: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !url.username().is_empty() {
            url.set_username("***").map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        if url.password().is_some() {
            url.set_password(None).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
