use sqlx::{postgres::PgPoolOptions, PgPool};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager and the Postgres store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Which backend credential a pool connects with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connection {
    /// Console queries, subject to the backend's row-level policies
    Main,
    /// Service role, used by the function endpoints
    Service,
}

impl Connection {
    fn env_name(&self) -> &'static str {
        match self {
            Connection::Main => "DATABASE_URL",
            Connection::Service => "SERVICE_DATABASE_URL",
        }
    }
}

/// Lazily created, cached connection pools
#[derive(Clone)]
pub struct DatabaseManager {
    config: DatabaseConfig,
    pools: Arc<RwLock<HashMap<Connection, PgPool>>>,
}

impl DatabaseManager {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn main_pool(&self) -> Result<PgPool, DatabaseError> {
        self.get_pool(Connection::Main).await
    }

    pub async fn service_pool(&self) -> Result<PgPool, DatabaseError> {
        self.get_pool(Connection::Service).await
    }

    /// Get existing pool or create a new one lazily
    async fn get_pool(&self, connection: Connection) -> Result<PgPool, DatabaseError> {
        // Fast path: try read lock
        {
            let pools = self.pools.read().await;
            if let Some(pool) = pools.get(&connection) {
                return Ok(pool.clone());
            }
        }

        let url = self.connection_string(connection)?;
        let pool = PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .acquire_timeout(Duration::from_secs(self.config.connection_timeout))
            .connect(url)
            .await?;

        // Another request may have raced us here; keep whichever landed first
        let mut pools = self.pools.write().await;
        let pool = pools.entry(connection).or_insert(pool).clone();

        info!("Created database pool for: {:?}", connection);
        Ok(pool)
    }

    fn connection_string(&self, connection: Connection) -> Result<&str, DatabaseError> {
        let url = match connection {
            Connection::Main => self.config.url.as_deref(),
            Connection::Service => self.config.service_url.as_deref(),
        };
        url.ok_or(DatabaseError::ConfigMissing(connection.env_name()))
    }

    /// Pings the main pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        let pool = self.main_pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close and remove all pools (e.g., on shutdown)
    pub async fn close_all(&self) {
        let mut pools = self.pools.write().await;
        for (name, pool) in pools.drain() {
            pool.close().await;
            info!("Closed database pool: {:?}", name);
        }
    }
}
