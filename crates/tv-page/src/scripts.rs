//! Script library registry.
//!
//! Elements declare the libraries they need as [`ScriptLibrary`] values. The
//! page collects the union with [`collect_scripts`], which orders known
//! libraries by a fixed load priority and appends custom libraries in
//! first-declaration order. [`ScriptRegistry`] maps each library to a pinned
//! CDN location and renders the tags.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::escape::{html_escape, js_string};

/// A JavaScript library an element (or the data loader) depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScriptLibrary {
    /// CSV parsing for the data loader.
    PapaParse,
    /// Parquet decoding for the data loader (ES module).
    Hyparquet,
    JQuery,
    JQueryUi,
    Plotly,
    PivotTable,
    /// Plotly renderers for PivotTable.js.
    PivotTablePlotlyRenderers,
    /// Any other script, loaded from `url` as-is.
    Custom { name: String, url: String },
}

impl ScriptLibrary {
    /// Load priority; lower loads first. Custom libraries have none.
    pub fn priority(&self) -> Option<u8> {
        match self {
            ScriptLibrary::PapaParse => Some(0),
            ScriptLibrary::Hyparquet => Some(1),
            ScriptLibrary::JQuery => Some(10),
            ScriptLibrary::JQueryUi => Some(11),
            ScriptLibrary::Plotly => Some(20),
            ScriptLibrary::PivotTable => Some(30),
            ScriptLibrary::PivotTablePlotlyRenderers => Some(31),
            ScriptLibrary::Custom { .. } => None,
        }
    }

    /// Registry key for known libraries, or the custom name.
    pub fn key(&self) -> &str {
        match self {
            ScriptLibrary::PapaParse => "papaparse",
            ScriptLibrary::Hyparquet => "hyparquet",
            ScriptLibrary::JQuery => "jquery",
            ScriptLibrary::JQueryUi => "jquery-ui",
            ScriptLibrary::Plotly => "plotly",
            ScriptLibrary::PivotTable => "pivottable",
            ScriptLibrary::PivotTablePlotlyRenderers => "pivottable-plotly",
            ScriptLibrary::Custom { name, .. } => name,
        }
    }
}

/// Deduplicate and order libraries for inclusion.
///
/// Known libraries come first, sorted by [`ScriptLibrary::priority`]; custom
/// libraries follow in the order they were first declared. Two custom entries
/// with the same name are one library.
pub fn collect_scripts<I>(libraries: I) -> Vec<ScriptLibrary>
where
    I: IntoIterator<Item = ScriptLibrary>,
{
    let mut known: BTreeMap<u8, ScriptLibrary> = BTreeMap::new();
    let mut custom: Vec<ScriptLibrary> = Vec::new();

    for library in libraries {
        match library.priority() {
            Some(priority) => {
                known.entry(priority).or_insert(library);
            }
            None => {
                if !custom.iter().any(|c| c.key() == library.key()) {
                    custom.push(library);
                }
            }
        }
    }

    known.into_values().chain(custom).collect()
}

/// CDN location of one library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdnLibrary {
    /// npm package name.
    pub package: String,
    /// Pinned version number.
    pub version: String,
    /// Script path within the package.
    pub path: String,
    /// Stylesheet path within the package, if the library ships one.
    #[serde(default)]
    pub stylesheet: Option<String>,
    /// Subresource integrity hash for the script.
    #[serde(default)]
    pub integrity: Option<String>,
}

impl CdnLibrary {
    /// Create a new CDN library configuration.
    pub fn new(
        package: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            version: version.into(),
            path: path.into(),
            stylesheet: None,
            integrity: None,
        }
    }

    /// Set the stylesheet path within the package.
    pub fn with_stylesheet(mut self, path: impl Into<String>) -> Self {
        self.stylesheet = Some(path.into());
        self
    }

    /// Pin the script with an SRI hash.
    pub fn with_integrity(mut self, integrity: impl Into<String>) -> Self {
        self.integrity = Some(integrity.into());
        self
    }

    /// Full CDN URL of the script.
    pub fn url(&self, base_url: &str) -> String {
        self.asset_url(base_url, &self.path)
    }

    /// Full CDN URL of the stylesheet.
    pub fn stylesheet_url(&self, base_url: &str) -> Option<String> {
        self.stylesheet
            .as_deref()
            .map(|path| self.asset_url(base_url, path))
    }

    fn asset_url(&self, base_url: &str, path: &str) -> String {
        format!(
            "{}/{}@{}/{}",
            base_url.trim_end_matches('/'),
            self.package,
            self.version,
            path
        )
    }
}

/// Known library locations plus the CDN base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRegistry {
    /// Base URL for CDN resources.
    #[serde(default = "default_cdn_base")]
    pub base_url: String,
    /// Library configurations, keyed by [`ScriptLibrary::key`].
    #[serde(default = "default_libraries")]
    pub libraries: HashMap<String, CdnLibrary>,
}

fn default_cdn_base() -> String {
    "https://cdn.jsdelivr.net/npm".to_string()
}

fn default_libraries() -> HashMap<String, CdnLibrary> {
    let mut libs = HashMap::new();

    libs.insert(
        "papaparse".to_string(),
        CdnLibrary::new("papaparse", "5.4.1", "papaparse.min.js"),
    );
    libs.insert(
        "hyparquet".to_string(),
        CdnLibrary::new("hyparquet", "1.5.0", "src/hyparquet.js"),
    );
    libs.insert(
        "jquery".to_string(),
        CdnLibrary::new("jquery", "3.7.1", "dist/jquery.min.js"),
    );
    libs.insert(
        "jquery-ui".to_string(),
        CdnLibrary::new("jquery-ui-dist", "1.13.2", "jquery-ui.min.js")
            .with_stylesheet("jquery-ui.min.css"),
    );
    libs.insert(
        "plotly".to_string(),
        CdnLibrary::new("plotly.js-dist-min", "2.35.2", "plotly.min.js"),
    );
    libs.insert(
        "pivottable".to_string(),
        CdnLibrary::new("pivottable", "2.23.0", "dist/pivot.min.js")
            .with_stylesheet("dist/pivot.min.css"),
    );
    libs.insert(
        "pivottable-plotly".to_string(),
        CdnLibrary::new("pivottable", "2.23.0", "dist/plotly_renderers.min.js"),
    );

    libs
}

impl Default for ScriptRegistry {
    fn default() -> Self {
        Self {
            base_url: default_cdn_base(),
            libraries: default_libraries(),
        }
    }
}

/// Rendered `<head>` stylesheets and `<body>` script tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptTags {
    pub styles: String,
    pub scripts: String,
}

impl ScriptRegistry {
    /// Override or add the location of a library.
    pub fn with_library(mut self, key: impl Into<String>, library: CdnLibrary) -> Self {
        self.libraries.insert(key.into(), library);
        self
    }

    /// Set the CDN base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Script URL for a library, if it is known to the registry.
    pub fn url_for(&self, library: &ScriptLibrary) -> Option<String> {
        match library {
            ScriptLibrary::Custom { url, .. } => Some(url.clone()),
            known => self
                .libraries
                .get(known.key())
                .map(|lib| lib.url(&self.base_url)),
        }
    }

    /// Render tags for an ordered library list.
    ///
    /// Known libraries missing from the registry are skipped.
    pub fn render(&self, libraries: &[ScriptLibrary]) -> ScriptTags {
        let mut tags = ScriptTags::default();

        for library in libraries {
            let Some(url) = self.url_for(library) else {
                continue;
            };
            let lib = match library {
                ScriptLibrary::Custom { .. } => None,
                known => self.libraries.get(known.key()),
            };

            if let Some(css) = lib.and_then(|l| l.stylesheet_url(&self.base_url)) {
                tags.styles.push_str(&format!(
                    "<link rel=\"stylesheet\" href=\"{}\">\n",
                    html_escape(&css)
                ));
            }

            let integrity = match lib.and_then(|l| l.integrity.as_deref()) {
                Some(sri) => format!(
                    " integrity=\"{}\" crossorigin=\"anonymous\"",
                    html_escape(sri)
                ),
                None => String::new(),
            };

            if *library == ScriptLibrary::Hyparquet {
                // ES module: publish it on window for the classic loader script.
                tags.scripts.push_str(&format!(
                    "<script type=\"module\">import * as hyparquet from {};\nwindow.hyparquet = hyparquet;\nwindow.dispatchEvent(new Event('tv-hyparquet-ready'));</script>\n",
                    js_string(&url)
                ));
            } else {
                tags.scripts.push_str(&format!(
                    "<script src=\"{}\"{}></script>\n",
                    html_escape(&url),
                    integrity
                ));
            }
        }

        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(name: &str) -> ScriptLibrary {
        ScriptLibrary::Custom {
            name: name.to_string(),
            url: format!("https://example.org/{}.js", name),
        }
    }

    #[test]
    fn test_collect_orders_known_then_custom() {
        let libs = collect_scripts(vec![
            custom("zeta"),
            ScriptLibrary::PivotTable,
            ScriptLibrary::Plotly,
            custom("alpha"),
            ScriptLibrary::JQuery,
            ScriptLibrary::Plotly,
            custom("zeta"),
        ]);
        assert_eq!(
            libs,
            vec![
                ScriptLibrary::JQuery,
                ScriptLibrary::Plotly,
                ScriptLibrary::PivotTable,
                custom("zeta"),
                custom("alpha"),
            ]
        );
    }

    #[test]
    fn test_collect_is_order_independent_for_known() {
        let a = collect_scripts(vec![ScriptLibrary::Plotly, ScriptLibrary::PapaParse]);
        let b = collect_scripts(vec![ScriptLibrary::PapaParse, ScriptLibrary::Plotly]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cdn_library_url() {
        let lib = CdnLibrary::new("plotly.js-dist-min", "2.35.2", "plotly.min.js");
        assert_eq!(
            lib.url("https://cdn.jsdelivr.net/npm/"),
            "https://cdn.jsdelivr.net/npm/plotly.js-dist-min@2.35.2/plotly.min.js"
        );
    }

    #[test]
    fn test_render_tags() {
        let registry = ScriptRegistry::default().with_library(
            "jquery",
            CdnLibrary::new("jquery", "3.7.1", "dist/jquery.min.js").with_integrity("sha384-abc"),
        );
        let tags = registry.render(&[
            ScriptLibrary::JQuery,
            ScriptLibrary::PivotTable,
            custom("extra"),
        ]);
        assert!(tags.styles.contains("pivottable@2.23.0/dist/pivot.min.css"));
        assert!(tags.scripts.contains(r#"integrity="sha384-abc" crossorigin="anonymous""#));
        assert!(tags
            .scripts
            .contains(r#"<script src="https://example.org/extra.js"></script>"#));
        let jquery = tags.scripts.find("jquery@").unwrap();
        let pivot = tags.scripts.find("pivot.min.js").unwrap();
        assert!(jquery < pivot);
    }

    #[test]
    fn test_hyparquet_is_module_import() {
        let tags = ScriptRegistry::default().render(&[ScriptLibrary::Hyparquet]);
        assert!(tags.scripts.starts_with("<script type=\"module\">"));
        assert!(tags.scripts.contains("window.hyparquet = hyparquet"));
    }

    #[test]
    fn test_registry_serialization() {
        let registry = ScriptRegistry::default();
        let json = serde_json::to_string(&registry).unwrap();
        let parsed: ScriptRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, registry);
        let minimal: ScriptRegistry = serde_json::from_str("{}").unwrap();
        assert_eq!(minimal.libraries.len(), 7);
    }
}
