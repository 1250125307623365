//! Standalone interactive HTML pages from tabular data.
//!
//! A [`Page`] holds datasets and an ordered list of visual elements. The
//! [`PageBuilder`] validates it, serializes the datasets in the page's
//! [`DataFormat`](tv_data::DataFormat), and writes either a single
//! self-contained HTML file (embedded formats) or a directory:
//!
//! ```text
//! <name>/
//!   <name>.html
//!   open.sh
//!   open.bat
//!   data/
//!     <dataset>.<csv|json|parquet>
//! ```
//!
//! # Elements
//!
//! - [`Chart`]: Plotly traces over dataset columns
//! - [`PivotTable`]: PivotTable.js over a dataset
//! - [`Table`]: static table rendered at build time
//! - [`TextBlock`]: caller HTML with script and style tags made inert
//! - [`LinkList`]: navigation links, rewritten inside projects
//! - [`Picture`] / [`Slides`]: base64-embedded images
//!
//! New kinds implement [`VisualElement`]; the builder never matches on them.
//!
//! # Example
//!
//! ```no_run
//! use tv_data::{Column, DataFormat, Dataset};
//! use tv_page::{Chart, Page, PageBuilder, PageConfig, Trace, TraceKind};
//! use std::path::Path;
//!
//! let ds = Dataset::new(
//!     "xy",
//!     vec![Column::integer("x", [1i64, 2, 3]), Column::integer("y", [10i64, 20, 30])],
//! )
//! .unwrap();
//! let page = Page::new(PageConfig::new("Demo").with_dataformat(DataFormat::Parquet))
//!     .with_dataset(ds)
//!     .with_element(Chart::new("Trend", "xy").with_trace(Trace::xy(TraceKind::Line, "x", "y")));
//! let artifact = PageBuilder::default().build(&page, Path::new("out/demo.html")).unwrap();
//! println!("{}", artifact.html_path.display());
//! ```

pub mod builder;
pub mod config;
pub mod element;
pub mod elements;
pub mod error;
pub mod escape;
pub mod launcher;
pub mod loader;
pub mod page;
pub mod scripts;

pub use builder::{PageArtifact, PageBuilder, PageLayout};
pub use config::{BuilderConfig, PageConfig};
pub use element::{ElementKind, LinkMap, RenderContext, VisualElement};
pub use elements::{
    Chart, ImageData, Link, LinkList, Picture, PivotTable, Slides, Table, TextBlock, Trace,
    TraceKind,
};
pub use error::{PageError, Result};
pub use launcher::{emit_launchers, Launchers, BAT_LAUNCHER, SH_LAUNCHER};
pub use page::Page;
pub use scripts::{collect_scripts, CdnLibrary, ScriptLibrary, ScriptRegistry, ScriptTags};
