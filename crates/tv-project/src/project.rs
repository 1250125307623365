//! Project input model: a cover page plus ordered sub-pages.

use serde::{Deserialize, Serialize};
use tv_data::DataFormat;
use tv_page::Page;

/// Project-wide options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Replaces every page's own data format when set.
    #[serde(default)]
    pub format_override: Option<DataFormat>,
    /// Also write `manifest.json` at the project root.
    #[serde(default)]
    pub write_manifest: bool,
}

impl ProjectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force one data format on every page.
    pub fn with_format_override(mut self, format: DataFormat) -> Self {
        self.format_override = Some(format);
        self
    }

    /// Write `manifest.json` next to the pages.
    pub fn with_manifest_file(mut self, write: bool) -> Self {
        self.write_manifest = write;
        self
    }

    /// Load configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A cover page and its linked sub-pages.
///
/// Sub-pages keep the order they were added in; that order assigns their
/// `page_N.html` file names.
#[derive(Debug, Default)]
pub struct Project {
    config: ProjectConfig,
    cover: Page,
    pages: Vec<Page>,
}

impl Project {
    /// Create a project with only a cover page.
    pub fn new(cover: Page) -> Self {
        Self {
            config: ProjectConfig::default(),
            cover,
            pages: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ProjectConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a sub-page.
    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    /// Append a sub-page.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Force one data format on every page.
    pub fn with_format_override(mut self, format: DataFormat) -> Self {
        self.config.format_override = Some(format);
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn cover(&self) -> &Page {
        &self.cover
    }

    /// Sub-pages in order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Project title (the cover page's).
    pub fn title(&self) -> &str {
        self.cover.title()
    }

    /// The format a page's datasets are written in.
    pub fn format_for(&self, page: &Page) -> DataFormat {
        self.config.format_override.unwrap_or_else(|| page.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tv_page::PageConfig;

    #[test]
    fn test_override_replaces_page_format() {
        let cover = Page::new(PageConfig::new("Cover").with_dataformat(DataFormat::JsonEmbedded));
        let page = Page::new(PageConfig::new("One").with_dataformat(DataFormat::CsvExternal));

        let project = Project::new(cover).with_page(page);
        assert_eq!(project.format_for(project.cover()), DataFormat::JsonEmbedded);
        assert_eq!(project.format_for(&project.pages()[0]), DataFormat::CsvExternal);

        let project = project.with_format_override(DataFormat::Parquet);
        assert_eq!(project.format_for(project.cover()), DataFormat::Parquet);
        assert_eq!(project.format_for(&project.pages()[0]), DataFormat::Parquet);
    }

    #[test]
    fn test_config_json() {
        let config = ProjectConfig::from_json(r#"{"format_override": "csv_external"}"#).unwrap();
        assert_eq!(config.format_override, Some(DataFormat::CsvExternal));
        assert!(!config.write_manifest);

        let config = ProjectConfig::new().with_manifest_file(true);
        let parsed = ProjectConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_default_config_is_empty_object() {
        assert_eq!(ProjectConfig::from_json("{}").unwrap(), ProjectConfig::default());
    }
}
