//! Data format selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Estimated size above which embedding degrades page load noticeably.
pub const EMBED_SIZE_THRESHOLD_BYTES: u64 = 50 * 1024 * 1024;

/// How a dataset is stored alongside (or inside) a page.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum DataFormat {
    /// CSV text inside the HTML document.
    #[default]
    CsvEmbedded,
    /// JSON array-of-objects inside the HTML document.
    JsonEmbedded,
    /// CSV file under `data/`.
    CsvExternal,
    /// JSON file under `data/`.
    JsonExternal,
    /// Compressed columnar file under `data/`.
    Parquet,
}

impl DataFormat {
    /// Every format, in declaration order.
    pub const ALL: [DataFormat; 5] = [
        DataFormat::CsvEmbedded,
        DataFormat::JsonEmbedded,
        DataFormat::CsvExternal,
        DataFormat::JsonExternal,
        DataFormat::Parquet,
    ];

    /// Get the canonical name, also used as the `data-format` attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::CsvEmbedded => "csv_embedded",
            DataFormat::JsonEmbedded => "json_embedded",
            DataFormat::CsvExternal => "csv_external",
            DataFormat::JsonExternal => "json_external",
            DataFormat::Parquet => "parquet",
        }
    }

    /// Whether the data lives inside the HTML document.
    pub fn is_embedded(&self) -> bool {
        matches!(self, DataFormat::CsvEmbedded | DataFormat::JsonEmbedded)
    }

    /// Whether the output is a directory tree (data files plus launchers).
    pub fn is_external(&self) -> bool {
        !self.is_embedded()
    }

    /// File extension of the serialized artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            DataFormat::CsvEmbedded | DataFormat::CsvExternal => "csv",
            DataFormat::JsonEmbedded | DataFormat::JsonExternal => "json",
            DataFormat::Parquet => "parquet",
        }
    }

    /// MIME type of the serialized artifact.
    pub fn mime_type(&self) -> &'static str {
        match self {
            DataFormat::CsvEmbedded | DataFormat::CsvExternal => "text/csv",
            DataFormat::JsonEmbedded | DataFormat::JsonExternal => "application/json",
            DataFormat::Parquet => "application/vnd.apache.parquet",
        }
    }

    /// Suggest a format for a dataset of the given estimated size.
    pub fn suggest(estimated_bytes: u64) -> DataFormat {
        if estimated_bytes > EMBED_SIZE_THRESHOLD_BYTES {
            DataFormat::Parquet
        } else {
            DataFormat::CsvEmbedded
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataFormat {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches(':').to_lowercase();
        DataFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| {
                DataError::Configuration(format!(
                    "unknown data format '{}' (expected one of: {})",
                    s,
                    DataFormat::ALL.map(|f| f.as_str()).join(", ")
                ))
            })
    }
}

impl TryFrom<String> for DataFormat {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataFormat> for String {
    fn from(format: DataFormat) -> Self {
        format.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_formats() {
        for format in DataFormat::ALL {
            assert_eq!(format.as_str().parse::<DataFormat>().unwrap(), format);
        }
        assert_eq!(":parquet".parse::<DataFormat>().unwrap(), DataFormat::Parquet);
        assert_eq!("CSV_External".parse::<DataFormat>().unwrap(), DataFormat::CsvExternal);
    }

    #[test]
    fn test_unknown_format_is_configuration_error() {
        let err = "xml_embedded".parse::<DataFormat>().unwrap_err();
        assert!(matches!(err, DataError::Configuration(_)));
        assert!(err.to_string().contains("xml_embedded"));
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&DataFormat::JsonExternal).unwrap();
        assert_eq!(json, "\"json_external\"");
        let parsed: DataFormat = serde_json::from_str("\"parquet\"").unwrap();
        assert_eq!(parsed, DataFormat::Parquet);
        assert!(serde_json::from_str::<DataFormat>("\"bogus\"").is_err());
    }

    #[test]
    fn test_topology_helpers() {
        assert!(DataFormat::CsvEmbedded.is_embedded());
        assert!(DataFormat::Parquet.is_external());
        assert_eq!(DataFormat::JsonEmbedded.extension(), "json");
        assert_eq!(DataFormat::Parquet.extension(), "parquet");
    }

    #[test]
    fn test_suggest_switches_to_parquet_above_threshold() {
        assert_eq!(DataFormat::suggest(1024), DataFormat::CsvEmbedded);
        assert_eq!(
            DataFormat::suggest(EMBED_SIZE_THRESHOLD_BYTES + 1),
            DataFormat::Parquet
        );
    }
}
