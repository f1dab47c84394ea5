//! Warehouse access layer.
//!
//! A thin typed wrapper over a single-connection sqlx pool. Every call
//! returns a structured `DbError` instead of logging and swallowing; the
//! decision of whether a failure aborts or continues the run belongs to the
//! pipelines, not to this layer.
//!
//! Autocommit semantics: statements execute one at a time on the pool, each
//! in its own implicit transaction. For this strictly sequential statement
//! stream that is equivalent to committing after every statement.

use async_trait::async_trait;
use snafu::prelude::*;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{ConnectSnafu, DbError, FetchSnafu, StatementSnafu};
use crate::sql::Table;

/// Statement execution seam between the pipelines and the warehouse.
///
/// The pipelines only ever run named statements and scalar count queries,
/// so this is the whole surface; tests substitute a fake to exercise the
/// orchestration and failure policy without a live cluster.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run one statement, returning the number of rows affected.
    async fn execute(&self, name: &str, sql: &str) -> Result<u64, DbError>;

    /// Run a query expected to return a single scalar count.
    async fn fetch_count(&self, sql: &str) -> Result<i64, DbError>;

    /// Drop a table if it exists.
    async fn drop_table(&self, table: &Table) -> Result<u64, DbError> {
        self.execute(table.name(), &table.drop_sql()).await
    }
}

/// Live connection to the Redshift cluster.
pub struct Warehouse {
    pool: PgPool,
}

impl Warehouse {
    /// Open a session against the configured cluster.
    ///
    /// The pool is capped at one connection: the pipelines are strictly
    /// sequential and the warehouse is treated as exclusively owned for the
    /// duration of a run. Connection failure is fatal to the caller.
    pub async fn connect(config: &Config) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(config.load.connect_timeout_secs))
            .connect(&config.cluster.connection_url())
            .await
            .context(ConnectSnafu)?;

        debug!(
            "Connected to {}:{}/{}",
            config.cluster.host, config.cluster.port, config.cluster.database
        );

        Ok(Self { pool })
    }

    /// Close the session, waiting for the connection to shut down.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Executor for Warehouse {
    async fn execute(&self, name: &str, sql: &str) -> Result<u64, DbError> {
        let result = sqlx::query(sql)
            .execute(&self.pool)
            .await
            .context(StatementSnafu { statement: name })?;
        debug!("{}: {} rows affected", name, result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn fetch_count(&self, sql: &str) -> Result<i64, DbError> {
        let row = sqlx::query(sql)
            .fetch_one(&self.pool)
            .await
            .context(FetchSnafu)?;
        row.try_get::<i64, _>(0).context(FetchSnafu)
    }
}
