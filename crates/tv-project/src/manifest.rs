//! Project manifest: every file a project build wrote, with checksums.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tv_data::DataFormat;

use crate::error::{ProjectError, Result};

/// Current manifest schema version.
pub const MANIFEST_SCHEMA_VERSION: &str = "1.0.0";

/// Manifest file name at the project root, when written.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Manifest of a built project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Schema version for this structure.
    pub schema_version: String,

    /// When the project was built.
    pub created_at: DateTime<Utc>,

    /// Project title (the cover page's).
    pub title: String,

    /// Cover page file, relative to the project root.
    pub cover: String,

    /// Sub-page files in order, relative to the project root.
    pub pages: Vec<String>,

    /// Datasets written, one entry per (name, format).
    #[serde(default)]
    pub datasets: Vec<DatasetEntry>,

    /// Files written, with checksums.
    pub files: Vec<FileEntry>,

    /// tabviz version that built this project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabviz_version: Option<String>,
}

impl ProjectManifest {
    pub fn new(title: impl Into<String>, cover: impl Into<String>) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION.to_string(),
            created_at: Utc::now(),
            title: title.into(),
            cover: cover.into(),
            pages: Vec::new(),
            datasets: Vec::new(),
            files: Vec::new(),
            tabviz_version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }
    }

    /// Add a file entry to the manifest.
    pub fn add_file(&mut self, entry: FileEntry) {
        self.files.push(entry);
    }

    /// Add a dataset entry to the manifest.
    pub fn add_dataset(&mut self, entry: DatasetEntry) {
        self.datasets.push(entry);
    }

    /// Get total size of all files in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }

    /// Get file count.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Find a file by relative path.
    pub fn find_file(&self, path: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Sort files for deterministic ordering.
    pub fn sort_files(&mut self) {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// Re-read every listed file under `root` and compare checksums.
    ///
    /// Returns the paths that are missing or no longer match.
    pub fn verify(&self, root: &Path) -> Vec<String> {
        self.files
            .iter()
            .filter(|entry| match fs::read(root.join(&entry.path)) {
                Ok(data) => !entry.verify(&data),
                Err(_) => true,
            })
            .map(|entry| entry.path.clone())
            .collect()
    }

    /// Write the manifest as `manifest.json` under `root`.
    pub fn write_to(&self, root: &Path) -> Result<u64> {
        let json = self.to_json()?;
        fs::write(root.join(MANIFEST_FILE_NAME), &json)?;
        Ok(json.len() as u64)
    }

    /// Serialize to JSON with consistent formatting.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(json)?;
        if manifest.schema_version != MANIFEST_SCHEMA_VERSION {
            return Err(ProjectError::UnsupportedVersion {
                version: manifest.schema_version,
                supported: MANIFEST_SCHEMA_VERSION.to_string(),
            });
        }
        Ok(manifest)
    }
}

/// A dataset as written into the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// Dataset name as given by the caller.
    pub name: String,

    /// Format it was serialized in.
    pub format: DataFormat,

    /// Data file, relative to the project root; `None` when embedded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Content fingerprint of the dataset.
    pub fingerprint: String,

    pub rows: usize,

    /// Pages referencing the dataset.
    pub pages: Vec<String>,
}

/// File entry in the manifest with checksum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path within the project (relative, `/`-separated).
    pub path: String,

    /// SHA-256 checksum (hex-encoded).
    pub sha256: String,

    /// File size in bytes.
    pub bytes: u64,

    /// MIME type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl FileEntry {
    /// Create a new file entry.
    pub fn new(path: impl Into<String>, sha256: impl Into<String>, bytes: u64) -> Self {
        Self {
            path: path.into(),
            sha256: sha256.into(),
            bytes,
            mime_type: None,
        }
    }

    /// Set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read `root/relative` and build its entry.
    pub fn from_file(root: &Path, relative: &str) -> Result<Self> {
        let data = fs::read(root.join(relative))?;
        let entry = Self::new(relative, Self::compute_checksum(&data), data.len() as u64);
        Ok(match mime_type_for(relative) {
            Some(mime) => entry.with_mime_type(mime),
            None => entry,
        })
    }

    /// Compute SHA-256 checksum of data.
    pub fn compute_checksum(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    /// Verify data against this entry's checksum.
    pub fn verify(&self, data: &[u8]) -> bool {
        self.bytes == data.len() as u64 && Self::compute_checksum(data) == self.sha256
    }
}

/// MIME type for a project file, by extension.
pub fn mime_type_for(path: &str) -> Option<&'static str> {
    let extension = Path::new(path).extension()?.to_str()?;
    let format = DataFormat::ALL
        .into_iter()
        .filter(|f| f.is_external())
        .find(|f| f.extension() == extension);
    if let Some(format) = format {
        return Some(format.mime_type());
    }
    match extension {
        "html" => Some("text/html"),
        "sh" => Some("application/x-sh"),
        "bat" => Some("application/x-bat"),
        "json" => Some("application/json"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_checksum_matches_known_digest() {
        assert_eq!(
            FileEntry::compute_checksum(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_file_entry_verify() {
        let entry = FileEntry::new("a.csv", FileEntry::compute_checksum(b"x,y\n"), 4);
        assert!(entry.verify(b"x,y\n"));
        assert!(!entry.verify(b"x,z\n"));
    }

    #[test]
    fn test_from_file_sets_mime_type() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("data")).unwrap();
        fs::write(temp_dir.path().join("data/a.csv"), "x\n1\n").unwrap();

        let entry = FileEntry::from_file(temp_dir.path(), "data/a.csv").unwrap();
        assert_eq!(entry.bytes, 4);
        assert_eq!(entry.mime_type.as_deref(), Some("text/csv"));
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_for("page_1.html"), Some("text/html"));
        assert_eq!(mime_type_for("data/x.parquet"), Some("application/vnd.apache.parquet"));
        assert_eq!(mime_type_for("open.sh"), Some("application/x-sh"));
        assert_eq!(mime_type_for("README"), None);
    }

    #[test]
    fn test_manifest_json_round_trip() {
        let mut manifest = ProjectManifest::new("Report", "Report.html");
        manifest.pages.push("page_1.html".to_string());
        manifest.add_file(FileEntry::new("b.html", "0".repeat(64), 2));
        manifest.add_file(FileEntry::new("a.html", "1".repeat(64), 3));
        manifest.sort_files();
        assert_eq!(manifest.files[0].path, "a.html");
        assert_eq!(manifest.total_bytes(), 5);

        let parsed = ProjectManifest::from_json(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut manifest = ProjectManifest::new("Report", "Report.html");
        manifest.schema_version = "9.9.9".to_string();
        let json = serde_json::to_string(&manifest).unwrap();
        let err = ProjectManifest::from_json(&json).unwrap_err();
        match err {
            ProjectError::UnsupportedVersion { version, supported } => {
                assert_eq!(version, "9.9.9");
                assert_eq!(supported, MANIFEST_SCHEMA_VERSION);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
