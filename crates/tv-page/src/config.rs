//! Page and builder configuration types.

use serde::{Deserialize, Serialize};
use tv_data::{DataFormat, EMBED_SIZE_THRESHOLD_BYTES};

use crate::scripts::ScriptRegistry;

/// Caller-facing options for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Browser tab title and page heading.
    #[serde(default = "default_title")]
    pub title: String,
    /// HTML shown under the heading.
    #[serde(default)]
    pub header: Option<String>,
    /// Free-text notes shown in the footer.
    #[serde(default)]
    pub notes: Option<String>,
    /// How the page's datasets are stored.
    #[serde(default)]
    pub dataformat: DataFormat,
    /// Name other pages of a project use to link here.
    #[serde(default)]
    pub slug: Option<String>,
}

fn default_title() -> String {
    "tabviz".to_string()
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            header: None,
            notes: None,
            dataformat: DataFormat::default(),
            slug: None,
        }
    }
}

impl PageConfig {
    /// Create a new page configuration.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the header HTML.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Set the footer notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Set the data format.
    pub fn with_dataformat(mut self, format: DataFormat) -> Self {
        self.dataformat = format;
        self
    }

    /// Set the link slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
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

/// Options shared by every page a builder produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Script library locations.
    #[serde(default)]
    pub scripts: ScriptRegistry,
    /// Run the HTML through a minifier before writing.
    #[serde(default)]
    pub minify: bool,
    /// Embedded datasets above this estimated size log a warning.
    #[serde(default = "default_embed_warn_bytes")]
    pub embed_warn_bytes: u64,
}

fn default_embed_warn_bytes() -> u64 {
    EMBED_SIZE_THRESHOLD_BYTES
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            scripts: ScriptRegistry::default(),
            minify: false,
            embed_warn_bytes: default_embed_warn_bytes(),
        }
    }
}

impl BuilderConfig {
    /// Create a new builder configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom script registry.
    pub fn with_scripts(mut self, scripts: ScriptRegistry) -> Self {
        self.scripts = scripts;
        self
    }

    /// Enable HTML minification.
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Set the embedded-size warning threshold.
    pub fn with_embed_warn_bytes(mut self, bytes: u64) -> Self {
        self.embed_warn_bytes = bytes;
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
