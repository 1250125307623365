//! The capability set every visual element implements.
//!
//! The page builder only talks to elements through [`VisualElement`]; it never
//! needs to know which concrete kinds exist. An element contributes two
//! fragments: the appearance fragment (static markup placed in the page body)
//! and the functional fragment (script run after the data loader is ready).

use std::collections::HashMap;
use std::fmt;

use crate::escape::js_string;
use crate::scripts::ScriptLibrary;

/// Kind of a visual element, used for CSS classes and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Chart,
    PivotTable,
    Table,
    Text,
    LinkList,
    Picture,
    Slides,
}

impl ElementKind {
    /// Get the string name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Chart => "chart",
            ElementKind::PivotTable => "pivot_table",
            ElementKind::Table => "table",
            ElementKind::Text => "text",
            ElementKind::LinkList => "link_list",
            ElementKind::Picture => "picture",
            ElementKind::Slides => "slides",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A renderable unit of a page.
pub trait VisualElement: fmt::Debug + Send + Sync {
    /// Title, unique within the page. Its sanitized form is the DOM id.
    fn id(&self) -> &str;

    /// Element kind.
    fn kind(&self) -> ElementKind;

    /// Names of the page datasets this element reads.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Script libraries this element needs on the page.
    fn required_scripts(&self) -> Vec<ScriptLibrary> {
        Vec::new()
    }

    /// Script body run once the page has loaded. Empty for static elements.
    fn functional_fragment(&self, _ctx: &RenderContext<'_>) -> String {
        String::new()
    }

    /// Markup placed inside the element's section.
    fn appearance_fragment(&self, ctx: &RenderContext<'_>) -> String;
}

/// Map from caller-authored link targets to the files actually written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMap {
    targets: HashMap<String, String>,
}

impl LinkMap {
    /// Create an empty map; every target resolves to itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `alias` to `file`.
    pub fn insert(&mut self, alias: impl Into<String>, file: impl Into<String>) {
        self.targets.insert(alias.into(), file.into());
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no alias is mapped.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Resolve a link target. A `#fragment` suffix is kept; absolute URLs and
    /// unknown targets pass through unchanged.
    pub fn resolve(&self, target: &str) -> String {
        if is_absolute_link(target) {
            return target.to_string();
        }
        let (base, fragment) = match target.split_once('#') {
            Some((base, fragment)) => (base, Some(fragment)),
            None => (target, None),
        };
        match (self.targets.get(base), fragment) {
            (Some(file), Some(fragment)) => format!("{}#{}", file, fragment),
            (Some(file), None) => file.clone(),
            (None, _) => target.to_string(),
        }
    }
}

fn is_absolute_link(target: &str) -> bool {
    target.contains("://")
        || target.starts_with("mailto:")
        || target.starts_with("data:")
        || target.starts_with('/')
}

/// What an element may ask of the page while rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    dom_id: &'a str,
    links: &'a LinkMap,
}

impl<'a> RenderContext<'a> {
    /// Create a context for the element with the given DOM id.
    pub fn new(dom_id: &'a str, links: &'a LinkMap) -> Self {
        Self { dom_id, links }
    }

    /// DOM id of the element's section; also a valid script identifier.
    pub fn dom_id(&self) -> &str {
        self.dom_id
    }

    /// DOM id for a child node, e.g. `child_id("plot")`.
    pub fn child_id(&self, suffix: &str) -> String {
        format!("{}-{}", self.dom_id, suffix)
    }

    /// JS expression evaluating to a promise of the dataset's rows.
    pub fn load_dataset(&self, name: &str) -> String {
        format!("tvData.load({})", js_string(name))
    }

    /// `.catch` clause logging a failed dataset load for this element.
    pub fn catch_load_error(&self) -> String {
        format!(
            ".catch(function (err) {{ console.error({}, err); }})",
            js_string(&format!("tabviz: {} could not load its data", self.dom_id))
        )
    }

    /// Resolve an intra-project link target.
    pub fn resolve_link(&self, target: &str) -> String {
        self.links.resolve(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_map_resolution() {
        let mut links = LinkMap::new();
        links.insert("details", "page_1.html");
        links.insert("details.html", "page_1.html");

        assert_eq!(links.resolve("details"), "page_1.html");
        assert_eq!(links.resolve("details.html#chart"), "page_1.html#chart");
        assert_eq!(links.resolve("https://example.org/details"), "https://example.org/details");
        assert_eq!(links.resolve("elsewhere.html"), "elsewhere.html");
        assert_eq!(links.resolve("#top"), "#top");
    }

    #[test]
    fn test_render_context_helpers() {
        let links = LinkMap::new();
        let ctx = RenderContext::new("Sales_Chart", &links);
        assert_eq!(ctx.child_id("plot"), "Sales_Chart-plot");
        assert_eq!(ctx.load_dataset(":shared"), r#"tvData.load(":shared")"#);
        assert_eq!(
            ctx.catch_load_error(),
            r#".catch(function (err) { console.error("tabviz: Sales_Chart could not load its data", err); })"#
        );
    }
}
