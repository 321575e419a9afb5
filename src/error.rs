use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a rebuild.
///
/// There is no partial-success state: any of these leaves the schema in
/// whatever shape the last committed statement left it, and the remedy is to
/// fix the input and rerun from the reset step.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {file}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("{file} has no column '{column}' required by table {table}")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
        file: String,
    },

    #[error("bad date in {table}.{column} for row {row_id}: '{value}' ({reason})")]
    Date {
        table: &'static str,
        column: &'static str,
        row_id: String,
        value: String,
        reason: String,
    },

    #[error("statement failed: {statement}")]
    Database {
        statement: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to read archive {path:?}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to parse override file {path:?}")]
    OverrideFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid date override: {0}")]
    Override(String),

    #[error("table catalog: {0}")]
    Catalog(String),

    #[error("configuration: {0}")]
    Config(String),

    #[error("failed to write report {path:?}")]
    Report {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SetupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SetupError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn database(
        statement: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SetupError::Database {
            statement: statement.into(),
            source: source.into(),
        }
    }
}

pub type Result<T, E = SetupError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_keeps_statement_and_source() {
        let err = SetupError::database("ALTER TABLE movies.movie ...", "duplicate key");
        assert_eq!(err.to_string(), "statement failed: ALTER TABLE movies.movie ...");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "duplicate key");
    }

    #[test]
    fn test_date_error_names_row() {
        let err = SetupError::Date {
            table: "movie",
            column: "release_date",
            row_id: "862".to_string(),
            value: "1995-13-40".to_string(),
            reason: "not a date".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("movie.release_date"));
        assert!(msg.contains("row 862"));
        assert!(msg.contains("1995-13-40"));
    }
}
