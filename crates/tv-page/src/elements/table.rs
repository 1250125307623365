//! Static HTML table rendered from a dataset at build time.

use std::sync::Arc;

use tv_data::Dataset;

use crate::element::{ElementKind, RenderContext, VisualElement};
use crate::escape::html_escape;

/// Table whose cells are written into the page markup.
///
/// The table carries its own dataset and does not depend on page data.
#[derive(Debug, Clone)]
pub struct Table {
    id: String,
    data: Arc<Dataset>,
    max_rows: Option<usize>,
}

impl Table {
    pub fn new(id: impl Into<String>, data: impl Into<Arc<Dataset>>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
            max_rows: None,
        }
    }

    /// Render at most `rows` rows.
    pub fn with_max_rows(mut self, rows: usize) -> Self {
        self.max_rows = Some(rows);
        self
    }
}

impl VisualElement for Table {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Table
    }

    fn appearance_fragment(&self, _ctx: &RenderContext<'_>) -> String {
        let header: String = self
            .data
            .column_names()
            .iter()
            .map(|name| format!("<th>{}</th>", html_escape(name)))
            .collect();

        let shown = self
            .max_rows
            .map_or(self.data.num_rows(), |max| max.min(self.data.num_rows()));
        let mut body = String::new();
        for row in 0..shown {
            body.push_str("<tr>");
            for column in self.data.columns() {
                let text = column.cell(row).to_text().unwrap_or_default();
                body.push_str(&format!("<td>{}</td>", html_escape(&text)));
            }
            body.push_str("</tr>\n");
        }

        let caption = if shown < self.data.num_rows() {
            format!(
                "<caption>Showing {} of {} rows</caption>",
                shown,
                self.data.num_rows()
            )
        } else {
            String::new()
        };

        format!(
            "<table class=\"tv-table\">{}<thead><tr>{}</tr></thead>\n<tbody>\n{}</tbody></table>",
            caption, header, body
        )
    }
}
