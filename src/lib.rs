//! chinook: a batch ETL tool for loading music-streaming logs into Redshift.
//!
//! This library provides components for rebuilding a seven-table star schema
//! (two staging tables, one fact table, four dimensions) and for running the
//! load: two S3 COPY statements into the staging tables followed by five
//! INSERT ... SELECT transforms into the final tables.
//!
//! # Example
//!
//! ```ignore
//! use chinook::{Config, run_load, error::EtlError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), EtlError> {
//!     let config = Config::from_file("chinook.yaml")?;
//!     let stats = run_load(&config).await?;
//!     println!("Ran {} statements", stats.statements_run);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod pipeline;
pub mod sql;

// Re-export main types
pub use config::Config;
pub use db::{Executor, Warehouse};
pub use pipeline::{LoadStats, SchemaStats, run_load, run_schema};
pub use sql::{OnFailure, Statement, Table};
