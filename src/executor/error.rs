//! Executor error types

use thiserror::Error;

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Executor errors
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Expression evaluation failed (type mismatch, overflow, division by zero)
    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error("column index {index} out of bounds (row has {row_len} columns)")]
    ColumnIndexOutOfBounds { index: usize, row_len: usize },

    #[error("column not found: {table}.{column}")]
    ColumnNotFound { table: String, column: String },

    /// Data source produced or was given unusable input
    #[error("data source error: {0}")]
    DataSource(String),

    /// Executor used outside its open/next/close protocol
    #[error("executor not open: {0}")]
    NotOpen(&'static str),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(String),
}
