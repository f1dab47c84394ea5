//! S3 bulk-load statements for the staging tables.
//!
//! Redshift's COPY ingests the JSON files directly from S3 using the
//! cluster's IAM role; no data flows through this process. The event logs
//! need an explicit JSONPaths mapping because their field names do not match
//! the column names; the song metadata maps automatically.

use crate::config::Config;

use super::{OnFailure, Statement};

/// Render the two COPY statements from the configured S3 locations.
///
/// COPY offers no row-level error reporting here; a malformed source record
/// either aborts the whole load or is skipped by the warehouse.
pub fn copy_statements(config: &Config) -> Vec<Statement> {
    vec![copy_events(config), copy_songs(config)]
}

fn copy_events(config: &Config) -> Statement {
    let sql = format!(
        "COPY staging_events\n\
         FROM '{}'\n\
         JSON '{}'\n\
         IAM_ROLE '{}'\n\
         REGION '{}'",
        config.s3.log_data, config.s3.log_jsonpath, config.iam_role.arn, config.s3.region
    );
    Statement::new("copy staging_events", sql, OnFailure::Abort)
}

fn copy_songs(config: &Config) -> Statement {
    let sql = format!(
        "COPY staging_songs\n\
         FROM '{}'\n\
         JSON 'auto'\n\
         IAM_ROLE '{}'\n\
         REGION '{}'",
        config.s3.song_data, config.iam_role.arn, config.s3.region
    );
    Statement::new("copy staging_songs", sql, OnFailure::Abort)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClusterConfig, IamRoleConfig, LoadConfig, S3Config};

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
                log_data: "s3://udacity-dend/log_data".to_string(),
                log_jsonpath: "s3://udacity-dend/log_json_path.json".to_string(),
                song_data: "s3://udacity-dend/song_data".to_string(),
                region: "us-west-2".to_string(),
            },
            load: LoadConfig::default(),
        }
    }

    #[test]
    fn test_events_copy_uses_jsonpaths() {
        let config = test_config();
        let statement = copy_events(&config);
        assert_eq!(statement.name, "copy staging_events");
        assert_eq!(statement.on_failure, OnFailure::Abort);
        assert!(statement.sql.contains("FROM 's3://udacity-dend/log_data'"));
        assert!(
            statement
                .sql
                .contains("JSON 's3://udacity-dend/log_json_path.json'")
        );
        assert!(
            statement
                .sql
                .contains("IAM_ROLE 'arn:aws:iam::123456789012:role/dwhRole'")
        );
        assert!(statement.sql.contains("REGION 'us-west-2'"));
    }

    #[test]
    fn test_songs_copy_infers_mapping() {
        let config = test_config();
        let statement = copy_songs(&config);
        assert!(statement.sql.contains("FROM 's3://udacity-dend/song_data'"));
        assert!(statement.sql.contains("JSON 'auto'"));
    }

    #[test]
    fn test_copy_order_events_then_songs() {
        let config = test_config();
        let statements = copy_statements(&config);
        let names: Vec<_> = statements.iter().map(|s| s.name).collect();
        assert_eq!(names, ["copy staging_events", "copy staging_songs"]);
    }
}
