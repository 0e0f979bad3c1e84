//! Error types for the table profiler.
//!
//! All fallible operations above the store boundary return [`ProfileError`].
//! The store boundary itself never fails: a failed query is reported as an
//! empty [`TabularResult`](crate::store::TabularResult).

use thiserror::Error;

use crate::catalog::ColumnKind;

/// The main error type for profiling operations.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from data source registration.
    #[error("Data source error ({source_type}): {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "Parquet", "PostgreSQL")
        source_type: String,
        /// Detailed error message
        message: String,
    },

    /// A cell could not be cast to the canonical type of its column.
    #[error("Cannot coerce value '{value}' in column '{column}' to {target}")]
    Coercion {
        column: String,
        value: String,
        target: ColumnKind,
    },

    /// Error when a required column is not part of the loaded table.
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// The column exists but was not classified as numeric, text or date.
    #[error("Column '{0}' has no profile for its data type")]
    UnsupportedColumn(String),

    /// A statistic was requested from a profiler that does not register it.
    #[error("Statistic '{statistic}' is not available for {kind} columns")]
    UnsupportedStatistic { statistic: String, kind: ColumnKind },

    /// Random sampling asked for more rows than the table holds.
    #[error("Cannot sample {requested} rows from a table with {available} rows")]
    SampleTooLarge { requested: usize, available: usize },

    /// An operation needs table data that has not been loaded yet.
    #[error("Table '{0}' has not been loaded")]
    NotLoaded(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Security-related error.
    #[error("Security error: {0}")]
    Security(String),
}

/// A type alias for `Result<T, ProfileError>`.
pub type Result<T> = std::result::Result<T, ProfileError>;

impl ProfileError {
    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
        }
    }

    /// Creates a coercion error for a single cell.
    pub fn coercion(column: impl Into<String>, value: impl ToString, target: ColumnKind) -> Self {
        Self::Coercion {
            column: column.into(),
            value: value.to_string(),
            target,
        }
    }

    /// Creates a column-not-found error.
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a security error.
    pub fn security(msg: impl Into<String>) -> Self {
        Self::Security(msg.into())
    }
}
