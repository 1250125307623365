//! Concrete visual elements.

pub mod chart;
pub mod links;
pub mod picture;
pub mod pivot;
pub mod slides;
pub mod table;
pub mod text;

pub use chart::{Chart, Trace, TraceKind};
pub use links::{Link, LinkList};
pub use picture::{image_mime_type, ImageData, Picture};
pub use pivot::PivotTable;
pub use slides::Slides;
pub use table::Table;
pub use text::TextBlock;
