//! Read serialized datasets back into a plain row table.
//!
//! This mirrors what the in-page loader does in the browser and is used to
//! check that every artifact parses back with the same shape.

use std::fs::File;
use std::path::Path;

use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{DataError, Result};
use crate::format::DataFormat;
use crate::schema::is_placeholder_schema;
use crate::serialize::Locator;

/// Column names plus stringly-typed cells; `None` is a missing cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl LoadedTable {
    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Positions `(row, column)` of missing cells, in row-major order.
    pub fn missing_positions(&self) -> Vec<(usize, usize)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, cell)| cell.is_none())
                    .map(move |(c, _)| (r, c))
            })
            .collect()
    }
}

/// Parse CSV text with a header row. Empty fields read as missing.
pub fn read_csv_rows(text: &str) -> Result<LoadedTable> {
    if text.is_empty() {
        return Ok(LoadedTable::default());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect(),
        );
    }
    Ok(LoadedTable { columns, rows })
}

/// Parse a JSON array of row objects. Column order follows the first row.
pub fn read_json_rows(text: &str) -> Result<LoadedTable> {
    let values: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(text)?;
    let columns: Vec<String> = values
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();

    let rows = values
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| match row.get(c) {
                    None | Some(serde_json::Value::Null) => None,
                    Some(serde_json::Value::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                })
                .collect()
        })
        .collect();
    Ok(LoadedTable { columns, rows })
}

/// Read every record batch of a parquet file, casting each column to text.
///
/// A file holding only the zero-column placeholder reads as an empty table.
pub fn read_parquet_batches(path: &Path) -> Result<LoadedTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    if is_placeholder_schema(builder.schema()) {
        return Ok(LoadedTable::default());
    }
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    let mut rows = Vec::new();
    for batch in builder.build()? {
        let batch = batch?;
        let text_columns = batch
            .columns()
            .iter()
            .map(|array| cast(array, &DataType::Utf8))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for row in 0..batch.num_rows() {
            rows.push(
                text_columns
                    .iter()
                    .map(|array| {
                        let strings = array.as_string::<i32>();
                        (!strings.is_null(row)).then(|| strings.value(row).to_string())
                    })
                    .collect(),
            );
        }
    }
    Ok(LoadedTable { columns, rows })
}

/// Load whatever a [`Locator`] points at; `base_dir` resolves external paths.
pub fn load_locator(locator: &Locator, base_dir: &Path) -> Result<LoadedTable> {
    match locator {
        Locator::Inline { format, blob } => match format {
            DataFormat::CsvEmbedded => read_csv_rows(blob),
            DataFormat::JsonEmbedded => read_json_rows(blob),
            other => Err(DataError::Configuration(format!(
                "inline locator carries non-embedded format '{}'",
                other
            ))),
        },
        Locator::External { format, path } => {
            let full = base_dir.join(path);
            match format {
                DataFormat::CsvExternal => read_csv_rows(&std::fs::read_to_string(full)?),
                DataFormat::JsonExternal => read_json_rows(&std::fs::read_to_string(full)?),
                DataFormat::Parquet => read_parquet_batches(&full),
                other => Err(DataError::Configuration(format!(
                    "external locator carries embedded format '{}'",
                    other
                ))),
            }
        }
    }
}
