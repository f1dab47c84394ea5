//! The two ETL pipelines.
//!
//! Both are single-threaded and strictly sequential: one connection, one
//! statement at a time, no retries and no partial-run resumption.
//!
//! - **Schema pipeline**: drop all seven tables, then recreate them.
//!   Running it twice in a row yields the same schema as running it once.
//! - **Load pipeline**: COPY the raw JSON into the staging tables, then run
//!   the five transform inserts, then log a per-table row-count summary.
//!
//! Failure handling is an explicit per-statement policy (`OnFailure`).
//! COPY failures abort the run. Transform failures are logged and recorded,
//! and the remaining statements still execute; the pipeline then returns
//! `EtlError::StatementsFailed` so a degraded run cannot exit 0.

use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::{Executor, Warehouse};
use crate::error::{DbSnafu, EtlError, StatementsFailedSnafu};
use crate::sql::{OnFailure, Statement, Table, copy_statements, transform_statements};

/// Statistics about a schema pipeline run.
#[derive(Debug, Clone, Default)]
pub struct SchemaStats {
    pub tables_dropped: usize,
    pub tables_created: usize,
}

/// Statistics about a load pipeline run.
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    pub statements_run: usize,
    pub rows_affected: u64,
    /// Names of statements that failed under the Continue policy.
    pub failed: Vec<String>,
    /// Per-table row counts gathered after the transforms.
    pub table_counts: Vec<(&'static str, i64)>,
}

/// Rebuild the warehouse schema using the given configuration.
pub async fn run_schema(config: &Config) -> Result<SchemaStats, EtlError> {
    let warehouse = Warehouse::connect(config).await.context(DbSnafu)?;
    let result = rebuild_schema(&warehouse).await;
    warehouse.close().await;
    result
}

/// Load the staging tables and transform them into the star schema.
pub async fn run_load(config: &Config) -> Result<LoadStats, EtlError> {
    let warehouse = Warehouse::connect(config).await.context(DbSnafu)?;
    let result = load_and_transform(&warehouse, config).await;
    warehouse.close().await;

    let stats = result?;
    if stats.failed.is_empty() {
        Ok(stats)
    } else {
        StatementsFailedSnafu {
            failed: stats.failed,
        }
        .fail()
    }
}

/// The full ordered statement plan for a load run. Used by `--dry-run` and
/// by tests; the load pipeline executes exactly this sequence.
pub fn statement_plan(config: &Config) -> Vec<Statement> {
    let mut plan = copy_statements(config);
    plan.extend(transform_statements());
    plan
}

/// Drop and recreate all seven tables.
///
/// Drops run in reverse creation order and individual drop failures do not
/// stop the loop: on a fresh cluster every drop is a no-op. Create failures
/// abort, since a half-created schema is unusable.
pub async fn rebuild_schema(executor: &dyn Executor) -> Result<SchemaStats, EtlError> {
    let mut stats = SchemaStats::default();

    info!("Dropping existing tables");
    for table in Table::ALL.iter().rev() {
        match executor.drop_table(table).await {
            Ok(_) => {
                stats.tables_dropped += 1;
                debug!("Dropped table {}", table.name());
            }
            Err(e) => warn!("Could not drop table {}: {}", table.name(), e),
        }
    }

    info!("Creating tables");
    for table in Table::ALL {
        executor
            .execute(table.name(), table.create_sql())
            .await
            .context(DbSnafu)?;
        stats.tables_created += 1;
        info!("Created table {}", table.name());
    }

    Ok(stats)
}

/// Run the load plan against the given executor.
///
/// Returns the stats even when transform statements failed; the caller
/// decides what a non-empty `failed` list means for the process exit.
pub async fn load_and_transform(
    executor: &dyn Executor,
    config: &Config,
) -> Result<LoadStats, EtlError> {
    let mut stats = LoadStats::default();

    info!("Loading staging tables from S3");
    run_statements(executor, &copy_statements(config), &mut stats).await?;

    info!("Transforming staging data into the star schema");
    run_statements(executor, &transform_statements(), &mut stats).await?;

    collect_table_counts(executor, &mut stats).await;

    if !stats.failed.is_empty() {
        warn!(
            "Load completed with {} failed statement(s): {}",
            stats.failed.len(),
            stats.failed.join(", ")
        );
    }

    Ok(stats)
}

/// Execute a statement sequence, applying each statement's failure policy.
async fn run_statements(
    executor: &dyn Executor,
    statements: &[Statement],
    stats: &mut LoadStats,
) -> Result<(), EtlError> {
    for statement in statements {
        match executor.execute(statement.name, &statement.sql).await {
            Ok(rows) => {
                stats.statements_run += 1;
                stats.rows_affected += rows;
                info!("{}: {} rows", statement.name, rows);
            }
            Err(e) => match statement.on_failure {
                OnFailure::Abort => return Err(e).context(DbSnafu),
                OnFailure::Continue => {
                    warn!("{} failed, continuing: {}", statement.name, e);
                    stats.failed.push(statement.name.to_string());
                }
            },
        }
    }
    Ok(())
}

/// Gather row counts for the summary log. Count failures only warn; the
/// summary is informational and must not fail an otherwise good run.
async fn collect_table_counts(executor: &dyn Executor, stats: &mut LoadStats) {
    info!("Row counts after load:");
    for table in Table::ALL {
        match executor.fetch_count(&table.count_sql()).await {
            Ok(count) => {
                info!("  {}: {} rows", table.name(), count);
                stats.table_counts.push((table.name(), count));
            }
            Err(e) => warn!("Could not count rows in {}: {}", table.name(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClusterConfig, IamRoleConfig, LoadConfig, S3Config};
    use crate::error::{DbError, StatementSnafu};
    use async_trait::async_trait;
    use snafu::IntoError;
    use std::sync::Mutex;

    fn test_config() -> Config {
        Config {
            cluster: ClusterConfig {
                host: "localhost".to_string(),
                port: 5439,
                database: "dwh".to_string(),
                user: "dwhuser".to_string(),
                password: "pw".to_string(),
            },
            iam_role: IamRoleConfig {
                arn: "arn:aws:iam::123456789012:role/dwhRole".to_string(),
            },
            s3: S3Config {
                log_data: "s3://bucket/log_data".to_string(),
                log_jsonpath: "s3://bucket/log_json_path.json".to_string(),
                song_data: "s3://bucket/song_data".to_string(),
                region: "us-west-2".to_string(),
            },
            load: LoadConfig::default(),
        }
    }

    fn simulated_failure(statement: &str) -> DbError {
        StatementSnafu { statement }
            .into_error(sqlx::Error::Protocol("simulated failure".to_string()))
    }

    /// Records every statement name it sees and fails the configured ones.
    struct FakeExecutor {
        executed: Mutex<Vec<String>>,
        fail_on: Vec<&'static str>,
    }

    impl FakeExecutor {
        fn new(fail_on: Vec<&'static str>) -> Self {
            Self {
                executed: Mutex::new(Vec::new()),
                fail_on,
            }
        }

        fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Executor for FakeExecutor {
        async fn execute(&self, name: &str, _sql: &str) -> Result<u64, DbError> {
            self.executed.lock().unwrap().push(name.to_string());
            if self.fail_on.contains(&name) {
                return Err(simulated_failure(name));
            }
            Ok(1)
        }

        async fn fetch_count(&self, _sql: &str) -> Result<i64, DbError> {
            Ok(42)
        }
    }

    #[tokio::test]
    async fn test_rebuild_schema_drops_then_creates_all_tables() {
        let executor = FakeExecutor::new(vec![]);
        let stats = rebuild_schema(&executor).await.unwrap();

        assert_eq!(stats.tables_dropped, 7);
        assert_eq!(stats.tables_created, 7);
        // 7 drops + 7 creates, staging tables created first
        let executed = executor.executed();
        assert_eq!(executed.len(), 14);
        assert_eq!(executed[7], "staging_events");
        assert_eq!(executed[8], "staging_songs");
    }

    #[tokio::test]
    async fn test_rebuild_schema_is_repeatable() {
        // Two consecutive runs issue the identical statement sequence
        let first = FakeExecutor::new(vec![]);
        rebuild_schema(&first).await.unwrap();
        let second = FakeExecutor::new(vec![]);
        rebuild_schema(&second).await.unwrap();
        assert_eq!(first.executed(), second.executed());
    }

    #[tokio::test]
    async fn test_drop_failure_does_not_stop_drop_loop() {
        let executor = FakeExecutor::new(vec!["songplays"]);
        // songplays is also created after the failed drop, so the create
        // phase fails on it too; only the drop loop tolerates failures.
        let result = rebuild_schema(&executor).await;
        assert!(result.is_err());
        // All 7 drops ran despite the songplays drop failing, in reverse
        // creation order, and the create phase still started
        let executed = executor.executed();
        assert_eq!(executed[0], "time");
        assert_eq!(executed[6], "staging_events");
        assert_eq!(executed[7], "staging_events");
    }

    #[tokio::test]
    async fn test_failed_insert_is_recorded_and_run_continues() {
        let executor = FakeExecutor::new(vec!["insert users"]);
        let stats = load_and_transform(&executor, &test_config()).await.unwrap();

        // Statements after the failed insert still executed
        let executed = executor.executed();
        assert!(executed.contains(&"insert time".to_string()));
        assert!(executed.contains(&"insert songplays".to_string()));

        assert_eq!(stats.failed, vec!["insert users".to_string()]);
        assert_eq!(stats.statements_run, 6); // 7 statements, 1 failed
    }

    #[tokio::test]
    async fn test_failed_copy_aborts_before_transforms() {
        let executor = FakeExecutor::new(vec!["copy staging_events"]);
        let result = load_and_transform(&executor, &test_config()).await;

        assert!(matches!(result, Err(EtlError::Db { .. })));
        let executed = executor.executed();
        assert_eq!(executed, vec!["copy staging_events".to_string()]);
    }

    #[tokio::test]
    async fn test_clean_load_runs_full_plan_and_counts() {
        let executor = FakeExecutor::new(vec![]);
        let stats = load_and_transform(&executor, &test_config()).await.unwrap();

        assert_eq!(stats.statements_run, 7);
        assert!(stats.failed.is_empty());
        assert_eq!(stats.table_counts.len(), 7);
        assert!(stats.table_counts.contains(&("songplays", 42)));
    }

    #[test]
    fn test_statement_plan_order() {
        let plan = statement_plan(&test_config());
        let names: Vec<_> = plan.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            [
                "copy staging_events",
                "copy staging_songs",
                "insert artists",
                "insert songs",
                "insert users",
                "insert time",
                "insert songplays"
            ]
        );
    }
}
