//! Error types for dataset construction and serialization.

use thiserror::Error;

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while building or serializing a dataset.
#[derive(Error, Debug)]
pub enum DataError {
    /// Invalid or unknown configuration value (e.g. a data format name).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Dataset was given an empty name.
    #[error("dataset name must not be empty")]
    EmptyName,

    /// Columns of one dataset disagree on row count.
    #[error("column '{column}' of dataset '{dataset}' has {actual} rows, expected {expected}")]
    RaggedColumns {
        dataset: String,
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Two columns of one dataset share a name.
    #[error("dataset '{dataset}' has more than one column named '{column}'")]
    DuplicateColumn { dataset: String, column: String },

    /// A categorical code points past the level list.
    #[error("categorical column '{column}' uses code {code} but has only {levels} levels")]
    InvalidCategoryCode {
        column: String,
        code: u32,
        levels: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding error.
    #[error("CSV error: {0}")]
    Csv(csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow array construction error.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet encoding error.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

// Filesystem failures inside the CSV writer surface as plain I/O errors.
impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        let io_kind = match err.kind() {
            csv::ErrorKind::Io(io) => Some(io.kind()),
            _ => None,
        };
        match io_kind {
            Some(kind) => DataError::Io(std::io::Error::new(kind, err.to_string())),
            None => DataError::Csv(err),
        }
    }
}

/// Errors raised when two names collide after sanitization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The same identifier was declared twice.
    #[error("duplicate {kind} identifier '{name}'")]
    Duplicate { kind: &'static str, name: String },

    /// Two distinct identifiers map to one sanitized name.
    #[error("ambiguous {kind} identifiers '{first}' and '{second}' collide as '{sanitized}'")]
    Ambiguous {
        kind: &'static str,
        first: String,
        second: String,
        sanitized: String,
    },
}
