//! Parquet writer for datasets.
//!
//! Files are written to a `.tmp` sibling and renamed into place, so a
//! re-run cleanly replaces an earlier artifact.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{WriterProperties, WriterVersion};
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::schema::{arrow_schema, record_batch};

/// Configuration for parquet output.
///
/// The default codec is snappy, the only compressed codec the in-page
/// parquet reader decodes without extra codec bundles.
#[derive(Debug, Clone)]
pub struct ParquetOptions {
    /// Compression codec.
    pub compression: Compression,

    /// Maximum rows per row group.
    pub max_row_group_size: usize,
}

impl Default for ParquetOptions {
    fn default() -> Self {
        ParquetOptions {
            compression: Compression::SNAPPY,
            max_row_group_size: 64 * 1024,
        }
    }
}

impl ParquetOptions {
    /// Use zstd at `level`. Pages reading these files need a reader with
    /// zstd support.
    pub fn with_zstd(mut self, level: i32) -> Result<Self> {
        self.compression = Compression::ZSTD(ZstdLevel::try_new(level)?);
        Ok(self)
    }

    /// Write uncompressed pages.
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Set a custom row group size.
    pub fn with_max_row_group_size(mut self, rows: usize) -> Self {
        self.max_row_group_size = rows;
        self
    }

    fn writer_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_writer_version(WriterVersion::PARQUET_2_0)
            .set_compression(self.compression)
            .set_max_row_group_size(self.max_row_group_size.max(1))
            // Dictionary encoding for string columns
            .set_dictionary_enabled(true)
            .build()
    }
}

/// Write a dataset as a parquet file at `path`, returning the bytes written.
///
/// Parent directories are created as needed.
pub fn write_parquet(dataset: &Dataset, path: &Path, options: &ParquetOptions) -> Result<u64> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path);
    let file = File::create(&temp_path)?;
    let schema = Arc::new(arrow_schema(dataset));
    let mut writer = ArrowWriter::try_new(file, schema, Some(options.writer_properties()))?;

    if dataset.num_rows() > 0 {
        writer.write(&record_batch(dataset)?)?;
    }
    writer.close()?;

    atomic_rename(&temp_path, path)?;
    let bytes = fs::metadata(path)?.len();

    debug!(
        dataset = %dataset.name(),
        rows = dataset.num_rows(),
        bytes,
        path = %path.display(),
        "Wrote parquet file"
    );
    Ok(bytes)
}

/// Write raw bytes to `path` through a temp file, creating parents.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<u64> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = temp_path_for(path);
    fs::write(&temp_path, data)?;
    atomic_rename(&temp_path, path)?;
    Ok(data.len() as u64)
}

/// Helper to rename temp file to final path atomically.
pub fn atomic_rename(temp_path: &Path, final_path: &Path) -> Result<()> {
    fs::rename(temp_path, final_path)?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use tempfile::TempDir;

    fn sample() -> Dataset {
        Dataset::new(
            "metrics",
            vec![
                Column::integer("x", [1i64, 2, 3]),
                Column::float("y", [Some(10.0), None, Some(30.0)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_options_defaults() {
        let options = ParquetOptions::default();
        assert!(matches!(options.compression, Compression::SNAPPY));
        assert!(matches!(
            options.with_zstd(3).unwrap().compression,
            Compression::ZSTD(_)
        ));
        assert!(ParquetOptions::default().with_zstd(99).is_err());
    }

    #[test]
    fn test_default_column_chunks_are_snappy() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metrics.parquet");
        write_parquet(&sample(), &path, &ParquetOptions::default()).unwrap();

        let reader = SerializedFileReader::new(File::open(&path).unwrap()).unwrap();
        let metadata = reader.metadata();
        assert!(metadata.num_row_groups() > 0);
        for group in metadata.row_groups() {
            for column in group.columns() {
                assert_eq!(column.compression(), Compression::SNAPPY);
            }
        }
    }

    #[test]
    fn test_write_parquet_creates_parents_and_no_temp_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("metrics.parquet");
        let bytes = write_parquet(&sample(), &path, &ParquetOptions::default()).unwrap();

        assert!(path.exists());
        assert!(bytes > 0);
        assert!(!temp_path_for(&path).exists());

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(rows, 3);
    }

    #[test]
    fn test_write_parquet_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metrics.parquet");
        write_parquet(&sample(), &path, &ParquetOptions::default()).unwrap();
        write_parquet(&sample(), &path, &ParquetOptions::default().uncompressed()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_temp_path_for() {
        let path = Path::new("/tmp/out/data/a.csv");
        assert_eq!(temp_path_for(path), PathBuf::from("/tmp/out/data/a.csv.tmp"));
    }

    #[test]
    fn test_write_atomic() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("f.txt");
        assert_eq!(write_atomic(&path, b"hello").unwrap(), 5);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }
}
