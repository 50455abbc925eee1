//! Error types for the event-study pipeline.

use thiserror::Error;

/// Result type for event-study operations.
pub type Result<T> = std::result::Result<T, EventStudyError>;

/// Errors that can occur while loading panels or running the pipeline.
///
/// Key violations are fatal: grouped computations downstream assume unique
/// keys, so the run is abandoned rather than partially completed.
#[derive(Debug, Error)]
pub enum EventStudyError {
    /// A declared key tuple occurs more than once
    #[error("Duplicate key in {table}: {key} occurs {occurrences} times")]
    DuplicateKey {
        /// Table the key belongs to
        table: String,
        /// Rendered offending key
        key: String,
        /// Number of rows sharing the key
        occurrences: usize,
    },

    /// A required column holds a null value
    #[error("Missing value in required column {column} of {table} at row {row}")]
    MissingValue {
        /// Table the column belongs to
        table: String,
        /// Column holding the null
        column: String,
        /// Zero-based row index in the input
        row: usize,
    },

    /// Missing required column in input data
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A date cell could not be parsed
    #[error("Invalid date {value:?} in column {column}")]
    InvalidDate {
        /// Column holding the value
        column: String,
        /// Raw cell value
        value: String,
    },

    /// A cell is outside the range its column allows
    #[error("Invalid value {value} in column {column}")]
    InvalidValue {
        /// Column holding the value
        column: String,
        /// Rendered cell value
        value: String,
    },

    /// Summary table not found in registry
    #[error("Summary table not found: {0}")]
    TableNotFound(String),

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}
