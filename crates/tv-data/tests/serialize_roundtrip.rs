//! Serialize + read-back tests across every data format.
//!
//! Validates:
//! - Row count and column names survive each format
//! - Missing cells stay missing at the same positions
//! - Parquet keeps date, timestamp and dictionary types
//! - Zero-row and zero-column datasets still produce parseable artifacts

use std::fs::File;

use arrow::datatypes::{DataType, TimeUnit};
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use proptest::prelude::*;
use tempfile::TempDir;
use tv_data::{
    is_placeholder_schema, load_locator, read_csv_rows, read_json_rows, serialize, to_csv_string,
    to_json_string, Column, DataFormat, Dataset, Destination, DATASET_NAME_KEY,
};

// ============================================================================
// Helpers
// ============================================================================

fn mixed_dataset() -> Dataset {
    let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
    Dataset::new(
        "mixed set",
        vec![
            Column::integer("id", [1i64, 2, 3, 4]),
            Column::float("score", [Some(0.5), None, Some(2.25), Some(f64::NAN)]),
            Column::string("label", [Some("alpha"), Some("b,c"), None, Some("</script>")]),
            Column::date("day", [Some(d(1)), Some(d(2)), None, Some(d(4))]),
            Column::boolean("flag", [Some(true), None, Some(false), Some(true)]),
            Column::categorical_from_values("group", [Some("x"), Some("y"), Some("x"), None]),
        ],
    )
    .unwrap()
}

fn destination_for(format: DataFormat, dir: &TempDir) -> Destination<'_> {
    if format.is_embedded() {
        Destination::Embed
    } else {
        Destination::Directory(dir.path())
    }
}

// ============================================================================
// Round-trip across formats
// ============================================================================

#[test]
fn test_every_format_round_trips_shape() {
    let ds = mixed_dataset();
    for format in DataFormat::ALL {
        let temp_dir = TempDir::new().unwrap();
        let locator = serialize(&ds, format, destination_for(format, &temp_dir)).unwrap();
        assert_eq!(locator.format(), format);

        let table = load_locator(&locator, temp_dir.path()).unwrap();
        assert_eq!(table.num_rows(), 4, "row count for {}", format);
        assert_eq!(
            table.columns,
            vec!["id", "score", "label", "day", "flag", "group"],
            "columns for {}",
            format
        );
    }
}

#[test]
fn test_missing_positions_agree_across_formats() {
    let ds = mixed_dataset();
    // NaN is written as missing by the text formats.
    let expected = vec![(1, 1), (1, 4), (2, 2), (2, 3), (3, 1), (3, 5)];

    for format in [
        DataFormat::CsvEmbedded,
        DataFormat::JsonEmbedded,
        DataFormat::CsvExternal,
        DataFormat::JsonExternal,
    ] {
        let temp_dir = TempDir::new().unwrap();
        let locator = serialize(&ds, format, destination_for(format, &temp_dir)).unwrap();
        let table = load_locator(&locator, temp_dir.path()).unwrap();
        assert_eq!(table.missing_positions(), expected, "format {}", format);
    }
}

#[test]
fn test_external_files_land_under_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let ds = mixed_dataset();
    for (format, name) in [
        (DataFormat::CsvExternal, "data/mixed_set.csv"),
        (DataFormat::JsonExternal, "data/mixed_set.json"),
        (DataFormat::Parquet, "data/mixed_set.parquet"),
    ] {
        let locator = serialize(&ds, format, Destination::Directory(temp_dir.path())).unwrap();
        assert_eq!(locator.relative_path(), Some(name));
        assert!(temp_dir.path().join(name).is_file());
    }
}

#[test]
fn test_reserialize_overwrites() {
    let temp_dir = TempDir::new().unwrap();
    let ds = mixed_dataset();
    let first = serialize(&ds, DataFormat::CsvExternal, Destination::Directory(temp_dir.path()))
        .unwrap();
    let second = serialize(&ds, DataFormat::CsvExternal, Destination::Directory(temp_dir.path()))
        .unwrap();
    assert_eq!(first, second);
    let entries = std::fs::read_dir(temp_dir.path().join("data")).unwrap().count();
    assert_eq!(entries, 1);
}

// ============================================================================
// Parquet type fidelity
// ============================================================================

#[test]
fn test_parquet_preserves_logical_types() {
    let temp_dir = TempDir::new().unwrap();
    let stamp = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    let ds = Dataset::new(
        "typed",
        vec![
            Column::date("d", [NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()]),
            Column::datetime("t", [stamp]),
            Column::categorical("c", ["low", "high"], [Some(1)]),
        ],
    )
    .unwrap();

    let locator = serialize(&ds, DataFormat::Parquet, Destination::Directory(temp_dir.path()))
        .unwrap();
    let path = temp_dir.path().join(locator.relative_path().unwrap());
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap()).unwrap();
    let schema = builder.schema().clone();

    assert_eq!(schema.field(0).data_type(), &DataType::Date32);
    assert_eq!(
        schema.field(1).data_type(),
        &DataType::Timestamp(TimeUnit::Microsecond, None)
    );
    assert_eq!(
        schema.field(2).data_type(),
        &DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8))
    );
    assert_eq!(
        schema.metadata().get(DATASET_NAME_KEY).map(String::as_str),
        Some("typed")
    );

    let table = load_locator(&locator, temp_dir.path()).unwrap();
    assert_eq!(table.rows[0][0].as_deref(), Some("2024-01-01"));
    assert_eq!(table.rows[0][2].as_deref(), Some("high"));
}

// ============================================================================
// Boundary cases
// ============================================================================

#[test]
fn test_zero_row_dataset_is_parseable_in_every_format() {
    let ds = Dataset::new(
        "empty rows",
        vec![
            Column::integer("a", Vec::<i64>::new()),
            Column::string("b", Vec::<Option<String>>::new()),
        ],
    )
    .unwrap();

    for format in DataFormat::ALL {
        let temp_dir = TempDir::new().unwrap();
        let locator = serialize(&ds, format, destination_for(format, &temp_dir)).unwrap();
        let table = load_locator(&locator, temp_dir.path()).unwrap();
        assert_eq!(table.num_rows(), 0, "format {}", format);
    }

    assert_eq!(to_csv_string(&ds).unwrap(), "a,b\n");
    assert_eq!(to_json_string(&ds).unwrap(), "[]");
}

#[test]
fn test_zero_column_dataset_text_formats() {
    let ds = Dataset::empty("blank").unwrap();
    let csv = serialize(&ds, DataFormat::CsvEmbedded, Destination::Embed).unwrap();
    let json = serialize(&ds, DataFormat::JsonEmbedded, Destination::Embed).unwrap();
    assert_eq!(read_csv_rows(csv.blob().unwrap()).unwrap().num_rows(), 0);
    assert_eq!(read_json_rows(json.blob().unwrap()).unwrap().num_rows(), 0);
}

#[test]
fn test_zero_column_dataset_parquet_reads_back_empty() {
    let temp_dir = TempDir::new().unwrap();
    let ds = Dataset::empty("blank").unwrap();
    let locator =
        serialize(&ds, DataFormat::Parquet, Destination::Directory(temp_dir.path())).unwrap();

    let loaded = load_locator(&locator, temp_dir.path()).unwrap();
    assert!(loaded.columns.is_empty());
    assert_eq!(loaded.num_rows(), 0);

    let full = temp_dir.path().join(locator.relative_path().unwrap());
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(full).unwrap()).unwrap();
    assert!(is_placeholder_schema(builder.schema()));
    let rows: usize = builder.build().unwrap().map(|b| b.unwrap().num_rows()).sum();
    assert_eq!(rows, 0);
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    #[test]
    fn prop_missing_positions_survive_text_formats(
        cells in prop::collection::vec(
            (prop::option::of(any::<i64>()), prop::option::of("[a-z ,\"]{1,8}")),
            0..24,
        )
    ) {
        let (ints, strings): (Vec<Option<i64>>, Vec<Option<String>>) = cells.into_iter().unzip();
        let ds = Dataset::new(
            "prop",
            vec![Column::integer("n", ints.clone()), Column::string("s", strings.clone())],
        )
        .unwrap();

        let expected: Vec<(usize, usize)> = ints
            .iter()
            .zip(&strings)
            .enumerate()
            .flat_map(|(r, (i, s))| {
                let mut out = Vec::new();
                if i.is_none() {
                    out.push((r, 0));
                }
                if s.is_none() {
                    out.push((r, 1));
                }
                out
            })
            .collect();

        let csv = read_csv_rows(&to_csv_string(&ds).unwrap()).unwrap();
        let json = read_json_rows(&to_json_string(&ds).unwrap()).unwrap();
        prop_assert_eq!(csv.num_rows(), ds.num_rows());
        prop_assert_eq!(csv.missing_positions(), expected.clone());
        prop_assert_eq!(json.missing_positions(), expected);
    }
}
