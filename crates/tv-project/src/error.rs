//! Error types for project builds.

use thiserror::Error;
use tv_data::{DataError, IdentifierError};
use tv_page::PageError;

/// Result type for project operations.
pub type Result<T> = std::result::Result<T, ProjectError>;

/// Errors that can occur while validating or writing a project.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// A page failed validation or could not be written.
    #[error("page '{page}': {source}")]
    Page {
        page: String,
        #[source]
        source: PageError,
    },

    /// Two pages carry different datasets under one name.
    #[error("dataset '{dataset}' differs between {first_page} and {second_page}: {detail}")]
    SchemaConflict {
        dataset: String,
        first_page: String,
        second_page: String,
        detail: String,
    },

    /// Manifest written by an incompatible schema version.
    #[error("unsupported manifest version {version} (supported: {supported})")]
    UnsupportedVersion { version: String, supported: String },

    /// Duplicate or ambiguous page slug or dataset name.
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    /// Dataset serialization error.
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProjectError {
    /// Wrap a page error with the page's label.
    pub fn page(page: impl Into<String>, source: PageError) -> Self {
        ProjectError::Page {
            page: page.into(),
            source,
        }
    }
}
