//! Arrow schema and record batch conversion for datasets.
//!
//! Logical types map as follows:
//! - `integer` -> Int64
//! - `float` -> Float64
//! - `string` -> Utf8
//! - `date` -> Date32
//! - `datetime` -> Timestamp(Microsecond, no timezone)
//! - `boolean` -> Boolean
//! - `categorical` -> Dictionary(Int32, Utf8)
//!
//! Every field is nullable. Parquet cannot store a schema without leaf
//! columns, so a zero-column dataset gets one all-null Boolean placeholder
//! column, flagged in the schema metadata so readers drop it again.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{
    new_null_array, ArrayRef, BooleanArray, Date32Array, DictionaryArray, Float64Array, Int32Array, Int64Array,
    StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Int32Type, Schema, TimeUnit};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use chrono::Datelike;

use crate::dataset::{ColumnData, ColumnType, Dataset};
use crate::error::Result;

/// Schema metadata key holding the original dataset name.
pub const DATASET_NAME_KEY: &str = "tabviz.dataset";

/// Schema metadata key present when the only column is the placeholder.
pub const PLACEHOLDER_KEY: &str = "tabviz.placeholder";

/// Name of the placeholder column written for zero-column datasets.
pub const PLACEHOLDER_COLUMN: &str = "__tabviz_empty";

/// Days from 0001-01-01 (CE) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Arrow type for a logical column type.
pub fn arrow_type(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::Integer => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::String => DataType::Utf8,
        ColumnType::Date => DataType::Date32,
        ColumnType::DateTime => DataType::Timestamp(TimeUnit::Microsecond, None),
        ColumnType::Boolean => DataType::Boolean,
        ColumnType::Categorical => {
            DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8))
        }
    }
}

/// Arrow schema for a dataset.
pub fn arrow_schema(dataset: &Dataset) -> Schema {
    let fields: Vec<Field> = dataset
        .columns()
        .iter()
        .map(|c| Field::new(c.name(), arrow_type(c.column_type()), true))
        .collect();
    let mut metadata =
        HashMap::from([(DATASET_NAME_KEY.to_string(), dataset.name().to_string())]);
    if fields.is_empty() {
        metadata.insert(PLACEHOLDER_KEY.to_string(), PLACEHOLDER_COLUMN.to_string());
        return Schema::new_with_metadata(
            vec![Field::new(PLACEHOLDER_COLUMN, DataType::Boolean, true)],
            metadata,
        );
    }
    Schema::new_with_metadata(fields, metadata)
}

/// Whether a schema read back from parquet only carries the placeholder.
pub fn is_placeholder_schema(schema: &Schema) -> bool {
    schema.metadata().contains_key(PLACEHOLDER_KEY)
}

/// Convert one column's storage to an Arrow array.
fn column_array(data: &ColumnData) -> Result<ArrayRef> {
    let array: ArrayRef = match data {
        ColumnData::Integer(v) => Arc::new(Int64Array::from(v.clone())),
        ColumnData::Float(v) => Arc::new(Float64Array::from(v.clone())),
        ColumnData::String(v) => Arc::new(StringArray::from_iter(v.iter().map(|s| s.as_deref()))),
        ColumnData::Date(v) => Arc::new(Date32Array::from(
            v.iter()
                .map(|d| d.map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE))
                .collect::<Vec<_>>(),
        )),
        ColumnData::DateTime(v) => Arc::new(TimestampMicrosecondArray::from(
            v.iter()
                .map(|dt| dt.map(|dt| dt.and_utc().timestamp_micros()))
                .collect::<Vec<_>>(),
        )),
        ColumnData::Boolean(v) => Arc::new(BooleanArray::from(v.clone())),
        ColumnData::Categorical { levels, codes } => {
            let keys = Int32Array::from(
                codes
                    .iter()
                    .map(|c| c.map(|c| c as i32))
                    .collect::<Vec<_>>(),
            );
            let values = Arc::new(StringArray::from_iter_values(levels.iter()));
            Arc::new(DictionaryArray::<Int32Type>::try_new(keys, values)?)
        }
    };
    Ok(array)
}

/// Build a single record batch holding every row of the dataset.
pub fn record_batch(dataset: &Dataset) -> Result<RecordBatch> {
    let schema = Arc::new(arrow_schema(dataset));
    let mut columns = dataset
        .columns()
        .iter()
        .map(|c| column_array(c.data()))
        .collect::<Result<Vec<_>>>()?;
    if columns.is_empty() {
        columns.push(new_null_array(&DataType::Boolean, dataset.num_rows()));
    }
    let options = RecordBatchOptions::new().with_row_count(Some(dataset.num_rows()));
    Ok(RecordBatch::try_new_with_options(schema, columns, &options)?)
}
