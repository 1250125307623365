//! Dataset serialization into the five on-disk / in-HTML representations.
//!
//! - `csv_embedded` / `json_embedded`: text blob returned inline
//! - `csv_external` / `json_external`: text file under `data/`
//! - `parquet`: compressed columnar file under `data/`
//!
//! Missing cells are never dropped: CSV writes an empty field, JSON writes
//! an explicit `null` for every missing key.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{DataError, Result};
use crate::format::DataFormat;
use crate::sanitize::sanitize;
use crate::writer::{write_atomic, write_parquet, ParquetOptions};

/// Directory (relative to the output root) holding external data files.
pub const DATA_DIR: &str = "data";

/// Where a serialized dataset goes.
#[derive(Debug, Clone, Copy)]
pub enum Destination<'a> {
    /// Keep the blob in memory for embedding into HTML.
    Embed,
    /// Write under `<root>/data/`.
    Directory(&'a Path),
}

/// Result of serializing a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// Blob to embed in the page.
    Inline { format: DataFormat, blob: String },
    /// Path relative to the output root, with `/` separators.
    External { format: DataFormat, path: String },
}

impl Locator {
    /// Format of the serialized artifact.
    pub fn format(&self) -> DataFormat {
        match self {
            Locator::Inline { format, .. } | Locator::External { format, .. } => *format,
        }
    }

    /// Inline blob, if embedded.
    pub fn blob(&self) -> Option<&str> {
        match self {
            Locator::Inline { blob, .. } => Some(blob),
            Locator::External { .. } => None,
        }
    }

    /// Relative path, if written to a file.
    pub fn relative_path(&self) -> Option<&str> {
        match self {
            Locator::Inline { .. } => None,
            Locator::External { path, .. } => Some(path),
        }
    }
}

/// Relative path (`data/<sanitized>.<ext>`) used for an external dataset.
pub fn relative_data_path(dataset_name: &str, format: DataFormat) -> String {
    format!(
        "{}/{}.{}",
        DATA_DIR,
        sanitize(dataset_name),
        format.extension()
    )
}

/// Serialize a dataset with default parquet options.
pub fn serialize(
    dataset: &Dataset,
    format: DataFormat,
    destination: Destination<'_>,
) -> Result<Locator> {
    serialize_with(dataset, format, destination, &ParquetOptions::default())
}

/// Serialize a dataset in the requested format.
///
/// External formats need a [`Destination::Directory`]; asking for one with
/// [`Destination::Embed`] is a configuration error. Embedded formats ignore
/// the destination directory.
pub fn serialize_with(
    dataset: &Dataset,
    format: DataFormat,
    destination: Destination<'_>,
    parquet: &ParquetOptions,
) -> Result<Locator> {
    let root = match (format.is_embedded(), destination) {
        (true, _) => {
            let blob = text_blob(dataset, format)?;
            debug!(
                dataset = %dataset.name(),
                format = %format,
                bytes = blob.len(),
                "Serialized dataset inline"
            );
            return Ok(Locator::Inline { format, blob });
        }
        (false, Destination::Embed) => {
            return Err(DataError::Configuration(format!(
                "format '{}' writes files and needs a destination directory",
                format
            )));
        }
        (false, Destination::Directory(root)) => root,
    };

    let relative = relative_data_path(dataset.name(), format);
    let path = root.join(&relative);
    let bytes = match format {
        DataFormat::Parquet => write_parquet(dataset, &path, parquet)?,
        _ => write_atomic(&path, text_blob(dataset, format)?.as_bytes())?,
    };

    debug!(
        dataset = %dataset.name(),
        format = %format,
        bytes,
        path = %relative,
        "Serialized dataset to file"
    );
    Ok(Locator::External {
        format,
        path: relative,
    })
}

fn text_blob(dataset: &Dataset, format: DataFormat) -> Result<String> {
    match format {
        DataFormat::CsvEmbedded | DataFormat::CsvExternal => to_csv_string(dataset),
        DataFormat::JsonEmbedded | DataFormat::JsonExternal => to_json_string(dataset),
        DataFormat::Parquet => Err(DataError::Configuration(
            "parquet has no text representation".to_string(),
        )),
    }
}

/// Encode a dataset as CSV with a header row.
///
/// A dataset with no columns encodes as the empty string.
pub fn to_csv_string(dataset: &Dataset) -> Result<String> {
    if dataset.num_columns() == 0 {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(dataset.column_names())?;

    let mut record: Vec<String> = Vec::with_capacity(dataset.num_columns());
    for row in 0..dataset.num_rows() {
        record.clear();
        record.extend(
            dataset
                .columns()
                .iter()
                .map(|c| c.cell(row).to_text().unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DataError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Encode a dataset as a JSON array of row objects with keys in column order.
pub fn to_json_string(dataset: &Dataset) -> Result<String> {
    let rows: Vec<serde_json::Value> = (0..dataset.num_rows())
        .map(|row| {
            let object: serde_json::Map<String, serde_json::Value> = dataset
                .columns()
                .iter()
                .map(|c| (c.name().to_string(), c.cell(row).to_json()))
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();
    Ok(serde_json::to_string(&rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use tempfile::TempDir;

    fn xy() -> Dataset {
        Dataset::new(
            "xy",
            vec![
                Column::integer("x", [1i64, 2, 3]),
                Column::integer("y", [10i64, 20, 30]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_csv_text() {
        assert_eq!(to_csv_string(&xy()).unwrap(), "x,y\n1,10\n2,20\n3,30\n");
    }

    #[test]
    fn test_csv_quotes_and_missing() {
        let ds = Dataset::new(
            "q",
            vec![
                Column::string("s", [Some("a,b"), None, Some("say \"hi\"")]),
                Column::integer("n", [Some(1i64), Some(2), None]),
            ],
        )
        .unwrap();
        assert_eq!(
            to_csv_string(&ds).unwrap(),
            "s,n\n\"a,b\",1\n,2\n\"say \"\"hi\"\"\",\n"
        );
    }

    #[test]
    fn test_json_text_has_explicit_nulls() {
        let ds = Dataset::new(
            "j",
            vec![
                Column::integer("a", [Some(1i64), None]),
                Column::string("b", [None, Some("z")]),
            ],
        )
        .unwrap();
        assert_eq!(
            to_json_string(&ds).unwrap(),
            r#"[{"a":1,"b":null},{"a":null,"b":"z"}]"#
        );
    }

    #[test]
    fn test_zero_column_dataset() {
        let ds = Dataset::empty("nothing").unwrap();
        assert_eq!(to_csv_string(&ds).unwrap(), "");
        assert_eq!(to_json_string(&ds).unwrap(), "[]");
    }

    #[test]
    fn test_embedded_locator() {
        let loc = serialize(&xy(), DataFormat::CsvEmbedded, Destination::Embed).unwrap();
        assert_eq!(loc.format(), DataFormat::CsvEmbedded);
        assert!(loc.blob().unwrap().starts_with("x,y\n"));
        assert!(loc.relative_path().is_none());
    }

    #[test]
    fn test_external_requires_directory() {
        let err = serialize(&xy(), DataFormat::CsvExternal, Destination::Embed).unwrap_err();
        assert!(matches!(err, DataError::Configuration(_)));
    }

    #[test]
    fn test_external_writes_under_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let ds = Dataset::new(":my data", xy().columns().to_vec()).unwrap();
        let loc = serialize(
            &ds,
            DataFormat::JsonExternal,
            Destination::Directory(temp_dir.path()),
        )
        .unwrap();
        assert_eq!(loc.relative_path(), Some("data/my_data.json"));
        let written = std::fs::read_to_string(temp_dir.path().join("data/my_data.json")).unwrap();
        assert!(written.starts_with(r#"[{"x":1,"y":10}"#));
    }

    #[test]
    fn test_relative_data_path() {
        assert_eq!(
            relative_data_path(":shared", DataFormat::Parquet),
            "data/shared.parquet"
        );
        assert_eq!(
            relative_data_path("a b", DataFormat::CsvExternal),
            "data/a_b.csv"
        );
    }
}
