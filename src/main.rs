//! chinook: a batch ETL tool for loading music-streaming logs into Redshift.
//!
//! Two subcommands, meant to run in order: `create-tables` rebuilds the
//! seven-table star schema (destructive), and `run` bulk-loads the raw JSON
//! from S3 into the staging tables and transforms it into the final tables.

mod config;
mod db;
mod error;
mod pipeline;
mod sql;

use clap::{Parser, Subcommand};
use snafu::prelude::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::{ConfigSnafu, EtlError};
use pipeline::{run_load, run_schema, statement_plan};

/// S3-to-Redshift ETL for song-play analytics.
#[derive(Parser, Debug)]
#[command(name = "chinook")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drop and recreate the staging and star-schema tables.
    CreateTables,
    /// Load the staging tables from S3 and insert into the star schema.
    Run {
        /// Validate configuration and print the statement plan without
        /// connecting to the cluster.
        #[arg(long)]
        dry_run: bool,
    },
}

#[snafu::report]
#[tokio::main]
async fn main() -> Result<(), EtlError> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("chinook starting");

    let config = Config::from_file(&args.config).context(ConfigSnafu)?;

    match args.command {
        Command::CreateTables => {
            let stats = run_schema(&config).await?;
            info!("Schema rebuilt successfully");
            info!("  Tables dropped: {}", stats.tables_dropped);
            info!("  Tables created: {}", stats.tables_created);
        }
        Command::Run { dry_run } => {
            if dry_run {
                info!("Dry run mode - validating configuration");
                info!("Cluster: {}:{}", config.cluster.host, config.cluster.port);
                for statement in statement_plan(&config) {
                    info!("  - {} ({:?})", statement.name, statement.on_failure);
                }
                info!("Configuration is valid");
                return Ok(());
            }

            let stats = run_load(&config).await?;
            info!("Load completed successfully");
            info!("  Statements run: {}", stats.statements_run);
            info!("  Rows affected: {}", stats.rows_affected);
        }
    }

    Ok(())
}
