//! SQL statement definitions for the warehouse.
//!
//! Everything the pipelines send to the cluster lives here: the seven table
//! definitions, the two S3 COPY statements, and the five transform inserts.
//! Statements are plain text in the Redshift dialect; nothing in this module
//! talks to the network.

mod copy;
mod schema;
mod transform;

pub use copy::copy_statements;
pub use schema::Table;
pub use transform::transform_statements;

/// What the statement runner does when a statement fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Stop the run immediately. Used for the COPY statements: transforms
    /// over unloaded staging tables would silently produce an empty schema.
    Abort,
    /// Log the failure, record it, and move on to the next statement.
    /// Used for the transform inserts (best-effort load); the pipeline
    /// still reports failure at the end of the run.
    Continue,
}

/// A named, ready-to-execute SQL statement with its failure policy.
#[derive(Debug, Clone)]
pub struct Statement {
    /// Short name used in logs and failure reports.
    pub name: &'static str,
    pub sql: String,
    pub on_failure: OnFailure,
}

impl Statement {
    pub fn new(name: &'static str, sql: impl Into<String>, on_failure: OnFailure) -> Self {
        Self {
            name,
            sql: sql.into(),
            on_failure,
        }
    }
}
