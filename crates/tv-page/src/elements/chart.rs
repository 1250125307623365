//! Plotly chart element.

use serde_json::{json, Value};

use crate::element::{ElementKind, RenderContext, VisualElement};
use crate::escape::{js_string, js_value};
use crate::scripts::ScriptLibrary;

/// Plotly trace type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    Scatter,
    Line,
    Bar,
    Histogram,
    Box,
}

impl TraceKind {
    /// Base Plotly trace attributes for this kind.
    fn plotly_attrs(&self) -> Value {
        match self {
            TraceKind::Scatter => json!({"type": "scatter", "mode": "markers"}),
            TraceKind::Line => json!({"type": "scatter", "mode": "lines"}),
            TraceKind::Bar => json!({"type": "bar"}),
            TraceKind::Histogram => json!({"type": "histogram"}),
            TraceKind::Box => json!({"type": "box"}),
        }
    }
}

/// One trace, drawing columns of the chart's dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub kind: TraceKind,
    pub x: String,
    pub y: Option<String>,
    pub name: Option<String>,
}

impl Trace {
    /// Trace over `x` alone (histograms, box plots).
    pub fn new(kind: TraceKind, x: impl Into<String>) -> Self {
        Self {
            kind,
            x: x.into(),
            y: None,
            name: None,
        }
    }

    /// Trace of `y` against `x`.
    pub fn xy(kind: TraceKind, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            y: Some(y.into()),
            ..Self::new(kind, x)
        }
    }

    /// Set the legend name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn to_js(&self) -> String {
        let mut fields = vec![format!("x: col({})", js_string(&self.x))];
        if let Some(y) = &self.y {
            fields.push(format!("y: col({})", js_string(y)));
        }
        if let Some(name) = &self.name {
            fields.push(format!("name: {}", js_string(name)));
        }
        format!(
            "Object.assign({}, {{ {} }})",
            js_value(&self.kind.plotly_attrs()),
            fields.join(", ")
        )
    }
}

/// Chart drawn by Plotly from one dataset.
#[derive(Debug, Clone)]
pub struct Chart {
    id: String,
    dataset: String,
    traces: Vec<Trace>,
    layout: Value,
}

impl Chart {
    /// Create a chart over `dataset` with no traces.
    pub fn new(id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dataset: dataset.into(),
            traces: Vec::new(),
            layout: json!({}),
        }
    }

    /// Add a trace.
    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.traces.push(trace);
        self
    }

    /// Set the Plotly layout object.
    pub fn with_layout(mut self, layout: Value) -> Self {
        self.layout = layout;
        self
    }

    /// Traces in drawing order.
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }
}

impl VisualElement for Chart {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Chart
    }

    fn dependencies(&self) -> Vec<String> {
        vec![self.dataset.clone()]
    }

    fn required_scripts(&self) -> Vec<ScriptLibrary> {
        vec![ScriptLibrary::Plotly]
    }

    fn functional_fragment(&self, ctx: &RenderContext<'_>) -> String {
        let traces: Vec<String> = self.traces.iter().map(Trace::to_js).collect();
        format!(
            r#"{load}.then(function (rows) {{
  var col = function (name) {{ return rows.map(function (r) {{ return r[name]; }}); }};
  Plotly.newPlot({target}, [{traces}], {layout}, {{ responsive: true }});
}}){catch_error};"#,
            load = ctx.load_dataset(&self.dataset),
            catch_error = ctx.catch_load_error(),
            target = js_string(&ctx.child_id("plot")),
            traces = traces.join(", "),
            layout = js_value(&self.layout),
        )
    }

    fn appearance_fragment(&self, ctx: &RenderContext<'_>) -> String {
        format!(r#"<div class="tv-plot" id="{}"></div>"#, ctx.child_id("plot"))
    }
}
