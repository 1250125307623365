//! Dataset model and serialization for tabviz pages.
//!
//! This crate provides:
//! - A validated, immutable tabular [`Dataset`] with missing-capable columns
//! - The five [`DataFormat`]s a page can carry its data in
//! - Filename and identifier sanitization with collision detection
//! - CSV, JSON and Parquet serialization returning a [`Locator`]
//! - Read-back helpers that parse artifacts into a [`LoadedTable`]
//!
//! # Example
//!
//! ```no_run
//! use tv_data::{serialize, Column, DataFormat, Dataset, Destination};
//!
//! let ds = Dataset::new(
//!     "sales",
//!     vec![
//!         Column::integer("x", [1i64, 2, 3]),
//!         Column::float("y", [Some(1.0), None, Some(3.5)]),
//!     ],
//! )
//! .unwrap();
//! let locator = serialize(&ds, DataFormat::CsvEmbedded, Destination::Embed).unwrap();
//! assert!(locator.blob().is_some());
//! ```

pub mod dataset;
pub mod error;
pub mod format;
pub mod loader;
pub mod sanitize;
pub mod schema;
pub mod serialize;
pub mod writer;

pub use dataset::{
    Cell, Column, ColumnData, ColumnType, Dataset, DatasetSchema, SchemaField, DATETIME_FORMAT,
    DATE_FORMAT,
};
pub use error::{DataError, IdentifierError, Result};
pub use format::{DataFormat, EMBED_SIZE_THRESHOLD_BYTES};
pub use loader::{load_locator, read_csv_rows, read_json_rows, read_parquet_batches, LoadedTable};
pub use sanitize::{sanitize, IdentifierSet, SafeName, PLACEHOLDER};
pub use schema::{
    arrow_schema, is_placeholder_schema, record_batch, DATASET_NAME_KEY, PLACEHOLDER_COLUMN,
    PLACEHOLDER_KEY,
};
pub use serialize::{
    relative_data_path, serialize, serialize_with, to_csv_string, to_json_string, Destination,
    Locator, DATA_DIR,
};
pub use writer::{write_atomic, write_parquet, ParquetOptions};
