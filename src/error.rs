use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the I/O and configuration layer around the pipeline.
///
/// Invalid patient rows are not errors; they come back as
/// [`crate::rules::RuleViolation`] values.
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataframe operation failed: {0}")]
    Polars(#[from] PolarsError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported output format {path:?}, expected .csv or .parquet")]
    OutputFormat { path: PathBuf },
    #[error("invalid limits: {reason}")]
    Limits { reason: String },
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PrepError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PrepError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PrepError::OutputFormat {
            path: PathBuf::from("out.xlsx"),
        };
        assert_eq!(
            err.to_string(),
            "unsupported output format \"out.xlsx\", expected .csv or .parquet"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let err: PrepError = PolarsError::ComputeError("boom".into()).into();
        assert!(matches!(err, PrepError::Polars(_)));
    }
}
