//! Tabular dataset model.
//!
//! A [`Dataset`] is a named, ordered set of row-aligned typed columns. Every
//! column is missing-capable: cells are stored as `Option<_>`. Datasets are
//! validated once at construction and are read-only afterwards.

use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{DataError, Result};

/// Text layout used for date cells in text formats.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text layout used for datetime cells in text formats.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Logical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Date,
    DateTime,
    Boolean,
    Categorical,
}

impl ColumnType {
    /// Get the string name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::String => "string",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Boolean => "boolean",
            ColumnType::Categorical => "categorical",
        }
    }

    /// Approximate encoded width of one present cell, in bytes.
    fn fixed_width(&self) -> u64 {
        match self {
            ColumnType::Boolean => 5,
            ColumnType::Date => 10,
            ColumnType::DateTime => 26,
            ColumnType::Integer | ColumnType::Float => 12,
            ColumnType::String | ColumnType::Categorical => 0,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Column storage, one variant per logical type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    String(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
    DateTime(Vec<Option<NaiveDateTime>>),
    Boolean(Vec<Option<bool>>),
    /// Codes index into `levels`.
    Categorical {
        levels: Vec<String>,
        codes: Vec<Option<u32>>,
    },
}

impl ColumnData {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::String(v) => v.len(),
            ColumnData::Date(v) => v.len(),
            ColumnData::DateTime(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Categorical { codes, .. } => codes.len(),
        }
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logical type of this storage.
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Integer(_) => ColumnType::Integer,
            ColumnData::Float(_) => ColumnType::Float,
            ColumnData::String(_) => ColumnType::String,
            ColumnData::Date(_) => ColumnType::Date,
            ColumnData::DateTime(_) => ColumnType::DateTime,
            ColumnData::Boolean(_) => ColumnType::Boolean,
            ColumnData::Categorical { .. } => ColumnType::Categorical,
        }
    }
}

/// A borrowed view of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Missing,
    Integer(i64),
    Float(f64),
    String(&'a str),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Boolean(bool),
}

impl Cell<'_> {
    /// Whether the cell carries no usable value.
    ///
    /// Non-finite floats count as missing: neither CSV nor JSON can carry them.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Float(f) => !f.is_finite(),
            _ => false,
        }
    }

    /// Render the cell for text formats; `None` for missing cells.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Missing => None,
            Cell::Float(f) if !f.is_finite() => None,
            Cell::Float(f) => Some(f.to_string()),
            Cell::Integer(i) => Some(i.to_string()),
            Cell::String(s) => Some((*s).to_string()),
            Cell::Date(d) => Some(d.format(DATE_FORMAT).to_string()),
            Cell::DateTime(dt) => Some(dt.format(DATETIME_FORMAT).to_string()),
            Cell::Boolean(b) => Some(b.to_string()),
        }
    }

    /// Render the cell as a JSON value; missing cells become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Cell::Missing => Value::Null,
            Cell::Integer(i) => Value::from(*i),
            Cell::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::String(s) => Value::String((*s).to_string()),
            Cell::Date(_) | Cell::DateTime(_) => {
                self.to_text().map(Value::String).unwrap_or(Value::Null)
            }
            Cell::Boolean(b) => Value::Bool(*b),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Create a column from raw storage.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Integer column; accepts plain values or `Option`s.
    pub fn integer<I, T>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<i64>>,
    {
        Self::new(
            name,
            ColumnData::Integer(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Float column; accepts plain values or `Option`s.
    pub fn float<I, T>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<f64>>,
    {
        Self::new(
            name,
            ColumnData::Float(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Boolean column; accepts plain values or `Option`s.
    pub fn boolean<I, T>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<bool>>,
    {
        Self::new(
            name,
            ColumnData::Boolean(values.into_iter().map(Into::into).collect()),
        )
    }

    /// String column with possibly missing cells.
    pub fn string<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self::new(
            name,
            ColumnData::String(values.into_iter().map(|v| v.map(Into::into)).collect()),
        )
    }

    /// Date column; accepts plain values or `Option`s.
    pub fn date<I, T>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<NaiveDate>>,
    {
        Self::new(
            name,
            ColumnData::Date(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Datetime column; accepts plain values or `Option`s.
    pub fn datetime<I, T>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<NaiveDateTime>>,
    {
        Self::new(
            name,
            ColumnData::DateTime(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Categorical column with explicit levels and codes.
    pub fn categorical<L, S, C>(name: impl Into<String>, levels: L, codes: C) -> Self
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
        C: IntoIterator<Item = Option<u32>>,
    {
        Self::new(
            name,
            ColumnData::Categorical {
                levels: levels.into_iter().map(Into::into).collect(),
                codes: codes.into_iter().collect(),
            },
        )
    }

    /// Categorical column built from values; levels follow first appearance.
    pub fn categorical_from_values<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let mut levels: Vec<String> = Vec::new();
        let mut codes = Vec::new();
        for value in values {
            let code = value.map(|v| {
                let v = v.into();
                match levels.iter().position(|l| *l == v) {
                    Some(pos) => pos as u32,
                    None => {
                        levels.push(v);
                        (levels.len() - 1) as u32
                    }
                }
            });
            codes.push(code);
        }
        Self::new(name, ColumnData::Categorical { levels, codes })
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column storage.
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Logical type.
    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the cell at `row`. Out-of-range rows read as missing.
    pub fn cell(&self, row: usize) -> Cell<'_> {
        fn get<T: Copy>(v: &[Option<T>], row: usize) -> Option<T> {
            v.get(row).copied().flatten()
        }
        match &self.data {
            ColumnData::Integer(v) => get(v, row).map_or(Cell::Missing, Cell::Integer),
            ColumnData::Float(v) => get(v, row).map_or(Cell::Missing, Cell::Float),
            ColumnData::Date(v) => get(v, row).map_or(Cell::Missing, Cell::Date),
            ColumnData::DateTime(v) => get(v, row).map_or(Cell::Missing, Cell::DateTime),
            ColumnData::Boolean(v) => get(v, row).map_or(Cell::Missing, Cell::Boolean),
            ColumnData::String(v) => match v.get(row) {
                Some(Some(s)) => Cell::String(s),
                _ => Cell::Missing,
            },
            ColumnData::Categorical { levels, codes } => {
                match get(codes, row).and_then(|c| levels.get(c as usize)) {
                    Some(level) => Cell::String(level),
                    None => Cell::Missing,
                }
            }
        }
    }

    /// Count of missing cells.
    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&r| self.cell(r).is_missing()).count()
    }

    fn estimated_bytes(&self) -> u64 {
        let width = self.column_type().fixed_width();
        (0..self.len())
            .map(|r| match self.cell(r) {
                Cell::String(s) => s.len() as u64 + 1,
                Cell::Missing => 1,
                _ => width + 1,
            })
            .sum()
    }
}

/// One entry of a dataset schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub column_type: ColumnType,
}

/// Ordered column names and types of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub fields: Vec<SchemaField>,
}

impl DatasetSchema {
    /// Describe how `other` differs from this schema.
    pub fn describe_difference(&self, other: &DatasetSchema) -> Option<String> {
        if self == other {
            return None;
        }
        let ours: Vec<String> = self.fields.iter().map(|f| f.to_string()).collect();
        let theirs: Vec<String> = other.fields.iter().map(|f| f.to_string()).collect();
        Some(format!("[{}] vs [{}]", ours.join(", "), theirs.join(", ")))
    }
}

impl fmt::Display for SchemaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.column_type)
    }
}

/// A named, typed, row-aligned table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Create a dataset, validating names, row alignment and category codes.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DataError::EmptyName);
        }

        let rows = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(DataError::DuplicateColumn {
                    dataset: name,
                    column: column.name().to_string(),
                });
            }
            if column.len() != rows {
                return Err(DataError::RaggedColumns {
                    dataset: name,
                    column: column.name().to_string(),
                    expected: rows,
                    actual: column.len(),
                });
            }
            if let ColumnData::Categorical { levels, codes } = column.data() {
                if let Some(code) = codes.iter().flatten().find(|&&c| c as usize >= levels.len()) {
                    return Err(DataError::InvalidCategoryCode {
                        column: column.name().to_string(),
                        code: *code,
                        levels: levels.len(),
                    });
                }
            }
        }

        Ok(Self {
            name,
            columns,
            rows,
        })
    }

    /// Create a dataset with no columns and no rows.
    pub fn empty(name: impl Into<String>) -> Result<Self> {
        Self::new(name, Vec::new())
    }

    /// Dataset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Find a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Schema (column names and logical types).
    pub fn schema(&self) -> DatasetSchema {
        DatasetSchema {
            fields: self
                .columns
                .iter()
                .map(|c| SchemaField {
                    name: c.name().to_string(),
                    column_type: c.column_type(),
                })
                .collect(),
        }
    }

    /// Rough size of the dataset once encoded as text, in bytes.
    pub fn estimated_bytes(&self) -> u64 {
        self.columns.iter().map(Column::estimated_bytes).sum()
    }

    /// SHA-256 over the schema and every cell (64 hex characters).
    ///
    /// Two datasets with equal fingerprints serialize identically. The dataset
    /// name is not part of the fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.rows as u64).to_le_bytes());
        for column in &self.columns {
            hasher.update(column.name().as_bytes());
            hasher.update([0x1e]);
            hasher.update(column.column_type().as_str().as_bytes());
            hasher.update([0x1e]);
            for row in 0..self.rows {
                match column.cell(row) {
                    Cell::Missing => hasher.update([0x00]),
                    Cell::Float(f) => {
                        hasher.update([0x01]);
                        hasher.update(f.to_bits().to_le_bytes());
                    }
                    cell => {
                        hasher.update([0x01]);
                        hasher.update(cell.to_text().unwrap_or_default().as_bytes());
                    }
                }
                hasher.update([0x1f]);
            }
        }
        hex::encode(hasher.finalize())
    }
}
