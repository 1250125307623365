//! Error types for page building.

use thiserror::Error;
use tv_data::{DataError, IdentifierError};

/// Result type for page operations.
pub type Result<T> = std::result::Result<T, PageError>;

/// Errors that can occur while validating or writing a page.
#[derive(Error, Debug)]
pub enum PageError {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// An element references a dataset the page does not carry.
    #[error("element '{element}' references missing dataset '{dataset}'")]
    MissingDataset { element: String, dataset: String },

    /// Duplicate or ambiguous element/dataset identifier.
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    /// Dataset serialization error.
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PageError {
    /// Whether this error was raised by validation, before anything was written.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PageError::Configuration(_) | PageError::MissingDataset { .. } | PageError::Identifier(_)
        )
    }
}
