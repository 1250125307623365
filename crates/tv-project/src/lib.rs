//! Multi-page tabviz projects.
//!
//! A [`Project`] is a cover [`Page`](tv_page::Page) plus ordered sub-pages.
//! [`ProjectBuilder`] writes them side by side into one directory:
//!
//! ```text
//! <name>/
//!   <name>.html        cover
//!   page_1.html
//!   page_2.html
//!   open.sh
//!   open.bat
//!   data/
//!     <dataset>.<csv|json|parquet>
//! ```
//!
//! A dataset name used on several pages is written once, and every page
//! points at the same file. Reusing a name for a different table is a
//! [`ProjectError::SchemaConflict`]. Link targets naming a page by slug,
//! title or position are rewritten to the file that page was given.

pub mod builder;
pub mod error;
pub mod manifest;
pub mod project;

pub use builder::{page_file_name, ProjectArtifact, ProjectBuilder, ProjectLayout, COVER_LABEL};
pub use error::{ProjectError, Result};
pub use manifest::{
    mime_type_for, DatasetEntry, FileEntry, ProjectManifest, MANIFEST_FILE_NAME,
    MANIFEST_SCHEMA_VERSION,
};
pub use project::{Project, ProjectConfig};
