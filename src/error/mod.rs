//! Error handling for the ETL pipeline.

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use std::io;

/// Specialized error type for pipeline operations
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Error opening, reading or writing a dataset file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error serializing a quality report
    #[error("Report serialization error: {0}")]
    Report(#[from] serde_json::Error),

    /// A required column is absent from the input dataset
    #[error("Input contract violation: missing required column '{column}'")]
    ColumnNotFound {
        /// Name of the missing column
        column: String,
    },

    /// The input dataset violates the stage's contract in some other way
    #[error("Input contract violation: {0}")]
    Contract(String),

    /// A fact row's foreign key did not resolve to exactly one dimension row
    ///
    /// This indicates an upstream contract break, never valid data; the
    /// warehouse build aborts without writing any table.
    #[error("unresolved {dimension} key {key} for record with patient_id {patient_id}")]
    UnresolvedKey {
        /// Dimension table whose index missed
        dimension: &'static str,
        /// The attribute tuple that failed to resolve
        key: String,
        /// Natural identity of the offending record
        patient_id: i64,
    },

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
