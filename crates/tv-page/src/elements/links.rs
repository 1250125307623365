//! Navigation link list.

use crate::element::{ElementKind, RenderContext, VisualElement};
use crate::escape::html_escape;

/// One entry of a [`LinkList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    /// As authored: a page slug, a file name, or any URL.
    pub target: String,
}

/// List of links. Targets naming project pages are rewritten to the files the
/// project builder assigns.
#[derive(Debug, Clone)]
pub struct LinkList {
    id: String,
    links: Vec<Link>,
}

impl LinkList {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            links: Vec::new(),
        }
    }

    /// Append a link.
    pub fn with_link(mut self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.links.push(Link {
            label: label.into(),
            target: target.into(),
        });
        self
    }

    /// Links as authored.
    pub fn links(&self) -> &[Link] {
        &self.links
    }
}

impl VisualElement for LinkList {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::LinkList
    }

    fn appearance_fragment(&self, ctx: &RenderContext<'_>) -> String {
        let items: String = self
            .links
            .iter()
            .map(|link| {
                format!(
                    "<li><a href=\"{}\">{}</a></li>\n",
                    html_escape(&ctx.resolve_link(&link.target)),
                    html_escape(&link.label)
                )
            })
            .collect();
        format!("<ul class=\"tv-links\">\n{}</ul>", items)
    }
}
