//! Error types for chinook using snafu.
//!
//! This module defines structured error types with context selectors for
//! all error conditions in the codebase.

use snafu::prelude::*;

// ============ Config Errors ============

/// Errors that can occur during configuration parsing and validation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[snafu(display("Failed to read configuration file"))]
    ReadFile { source: std::io::Error },

    /// Environment variable interpolation failed.
    #[snafu(display("Environment variable interpolation failed:\n{message}"))]
    EnvInterpolation { message: String },

    /// Failed to parse YAML configuration.
    #[snafu(display("Failed to parse YAML configuration"))]
    YamlParse { source: serde_yaml::Error },

    /// Cluster host is empty.
    #[snafu(display("Cluster host cannot be empty"))]
    EmptyHost,

    /// Cluster database name is empty.
    #[snafu(display("Cluster database name cannot be empty"))]
    EmptyDatabase,

    /// Cluster user is empty.
    #[snafu(display("Cluster user cannot be empty"))]
    EmptyUser,

    /// Cluster port is zero.
    #[snafu(display("Cluster port must be nonzero"))]
    InvalidPort,

    /// IAM role ARN is empty.
    #[snafu(display("IAM role ARN cannot be empty"))]
    EmptyIamRole,

    /// An S3 location does not use the s3:// scheme.
    #[snafu(display("Invalid S3 URI for {field}: {uri}"))]
    InvalidS3Uri { field: &'static str, uri: String },
}

// ============ Database Errors ============

/// Errors that can occur while talking to the warehouse.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DbError {
    /// Failed to open a connection to the cluster.
    #[snafu(display("Failed to connect to the warehouse"))]
    Connect { source: sqlx::Error },

    /// A statement failed to execute.
    #[snafu(display("Statement failed: {statement}"))]
    Statement {
        statement: String,
        source: sqlx::Error,
    },

    /// Failed to fetch query results.
    #[snafu(display("Failed to fetch query results"))]
    Fetch { source: sqlx::Error },
}

// ============ Etl Error (top-level) ============

/// Top-level errors that aggregate all error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EtlError {
    /// Configuration error.
    #[snafu(display("Configuration error"))]
    Config { source: ConfigError },

    /// Warehouse access error.
    #[snafu(display("Warehouse error"))]
    Db { source: DbError },

    /// One or more statements failed during a best-effort phase.
    #[snafu(display("{} statement(s) failed: {}", failed.len(), failed.join(", ")))]
    StatementsFailed { failed: Vec<String> },
}
