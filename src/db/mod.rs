pub mod config;
pub mod operations;
pub mod schema;

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::config::DbConfig;
use crate::db::schema::{split_sql_statements, ENTRY_SCHEMA_SQL};

/// Pooled handle to the document store. Cheap to clone.
#[derive(Clone)]
pub struct DatabaseProxy {
    pool: SqlitePool,
}

impl DatabaseProxy {
    pub async fn connect(config: DbConfig) -> Result<Arc<Self>, DbInitError> {
        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(DbInitError::Config)?
            .create_if_missing(true)
            .busy_timeout(config.busy_timeout);

        let mut pool_options = SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout);

        if config.is_in_memory() {
            // every connection to :memory: is its own database; pin exactly one
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options.journal_mode(SqliteJournalMode::Wal);
            pool_options = pool_options.max_connections(config.max_connections);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(DbInitError::Sqlx)?;

        bootstrap_schema(&pool).await?;

        tracing::info!(
            in_memory = config.is_in_memory(),
            max_connections = config.max_connections,
            "document store ready"
        );

        Ok(Arc::new(Self { pool }))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trips a trivial query and reports its latency.
    pub async fn ping(&self, timeout: Duration) -> Result<Duration, String> {
        let started = Instant::now();
        match tokio::time::timeout(timeout, sqlx::query("SELECT 1").execute(&self.pool)).await {
            Ok(Ok(_)) => Ok(started.elapsed()),
            Ok(Err(err)) => Err(err.to_string()),
            Err(_) => Err("timeout".to_string()),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn bootstrap_schema(pool: &SqlitePool) -> Result<(), DbInitError> {
    for stmt in split_sql_statements(ENTRY_SCHEMA_SQL) {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(DbInitError::Sqlx)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error("invalid DATABASE_URL: {0}")]
    Config(#[source] sqlx::Error),
    #[error(transparent)]
    Sqlx(sqlx::Error),
}
