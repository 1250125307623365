//! Caller-authored HTML block.

use crate::element::{ElementKind, RenderContext, VisualElement};
use crate::escape::{html_escape, neutralize_raw_text_tags};

/// Block of HTML. Script and style tags inside it are rendered inert.
#[derive(Debug, Clone)]
pub struct TextBlock {
    id: String,
    html: String,
}

impl TextBlock {
    /// Block from HTML markup.
    pub fn new(id: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            html: html.into(),
        }
    }

    /// Block from plain text, escaped and wrapped in a paragraph.
    pub fn plain(id: impl Into<String>, text: &str) -> Self {
        Self::new(id, format!("<p>{}</p>", html_escape(text)))
    }
}

impl VisualElement for TextBlock {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Text
    }

    fn appearance_fragment(&self, _ctx: &RenderContext<'_>) -> String {
        format!(
            "<div class=\"tv-text\">{}</div>",
            neutralize_raw_text_tags(&self.html)
        )
    }
}
