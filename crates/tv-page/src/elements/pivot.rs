//! PivotTable.js element.

use serde_json::{Map, Value};

use crate::element::{ElementKind, RenderContext, VisualElement};
use crate::escape::{js_string, js_value};
use crate::scripts::ScriptLibrary;

/// Interactive pivot table over one dataset.
#[derive(Debug, Clone, Default)]
pub struct PivotTable {
    id: String,
    dataset: String,
    rows: Vec<String>,
    cols: Vec<String>,
    vals: Vec<String>,
    aggregator: Option<String>,
    renderer: Option<String>,
}

impl PivotTable {
    /// Create a pivot table over `dataset` with nothing preselected.
    pub fn new(id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dataset: dataset.into(),
            ..Self::default()
        }
    }

    /// Preselect row attributes.
    pub fn with_rows<I, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows = rows.into_iter().map(Into::into).collect();
        self
    }

    /// Preselect column attributes.
    pub fn with_cols<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cols = cols.into_iter().map(Into::into).collect();
        self
    }

    /// Preselect the aggregator, e.g. `"Sum"` over `vals`.
    pub fn with_aggregator<I, S>(mut self, aggregator: impl Into<String>, vals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregator = Some(aggregator.into());
        self.vals = vals.into_iter().map(Into::into).collect();
        self
    }

    /// Preselect the renderer, e.g. `"Heatmap"` or `"Bar Chart"`.
    pub fn with_renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }

    fn options(&self) -> Value {
        let list = |v: &[String]| Value::Array(v.iter().cloned().map(Value::String).collect());
        let mut options = Map::new();
        options.insert("rows".to_string(), list(&self.rows));
        options.insert("cols".to_string(), list(&self.cols));
        if !self.vals.is_empty() {
            options.insert("vals".to_string(), list(&self.vals));
        }
        if let Some(aggregator) = &self.aggregator {
            options.insert("aggregatorName".to_string(), Value::String(aggregator.clone()));
        }
        if let Some(renderer) = &self.renderer {
            options.insert("rendererName".to_string(), Value::String(renderer.clone()));
        }
        Value::Object(options)
    }
}

impl VisualElement for PivotTable {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::PivotTable
    }

    fn dependencies(&self) -> Vec<String> {
        vec![self.dataset.clone()]
    }

    fn required_scripts(&self) -> Vec<ScriptLibrary> {
        vec![
            ScriptLibrary::JQuery,
            ScriptLibrary::JQueryUi,
            ScriptLibrary::Plotly,
            ScriptLibrary::PivotTable,
            ScriptLibrary::PivotTablePlotlyRenderers,
        ]
    }

    fn functional_fragment(&self, ctx: &RenderContext<'_>) -> String {
        format!(
            r#"{load}.then(function (rows) {{
  var utils = $.pivotUtilities;
  var options = Object.assign({options}, {{ renderers: $.extend({{}}, utils.renderers, utils.plotly_renderers) }});
  $(document.getElementById({target})).pivotUI(rows, options);
}}){catch_error};"#,
            load = ctx.load_dataset(&self.dataset),
            catch_error = ctx.catch_load_error(),
            options = js_value(&self.options()),
            target = js_string(&ctx.child_id("pivot")),
        )
    }

    fn appearance_fragment(&self, ctx: &RenderContext<'_>) -> String {
        format!(r#"<div class="tv-pivot" id="{}"></div>"#, ctx.child_id("pivot"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::LinkMap;

    #[test]
    fn test_pivot_options() {
        let pivot = PivotTable::new("Pivot", "sales")
            .with_rows(["region"])
            .with_cols(["year"])
            .with_aggregator("Sum", ["revenue"])
            .with_renderer("Heatmap");
        let links = LinkMap::new();
        let js = pivot.functional_fragment(&RenderContext::new("Pivot", &links));

        assert!(js.contains(r#""rows":["region"],"cols":["year"],"vals":["revenue"]"#));
        assert!(js.contains(r#""aggregatorName":"Sum""#));
        assert!(js.contains(r#""rendererName":"Heatmap""#));
        assert!(js.contains(r#"getElementById("Pivot-pivot")"#));
        assert!(js.contains(r#".catch(function (err) { console.error("tabviz: Pivot could not load"#));
    }

    #[test]
    fn test_pivot_scripts_include_jquery_stack() {
        let pivot = PivotTable::new("P", "d");
        let scripts = pivot.required_scripts();
        assert!(scripts.contains(&ScriptLibrary::JQuery));
        assert!(scripts.contains(&ScriptLibrary::PivotTable));
    }
}
