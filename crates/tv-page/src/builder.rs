//! Page builder implementation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use tv_data::{
    relative_data_path, sanitize, serialize, DataFormat, Dataset, Destination, IdentifierSet,
    Locator, SafeName,
};

use crate::config::BuilderConfig;
use crate::element::{LinkMap, RenderContext};
use crate::error::{PageError, Result};
use crate::escape::{guard_inline_script, html_escape, js_string, neutralize_raw_text_tags};
use crate::launcher::{emit_launchers, Launchers};
use crate::loader::{dataset_marker, loader_scripts, LOADER_JS};
use crate::page::Page;
use crate::scripts::{collect_scripts, ScriptLibrary};

/// Where a page's files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    /// Sanitized base name.
    pub stem: SafeName,
    /// Output directory for directory-style formats.
    pub root: Option<PathBuf>,
    /// HTML file path.
    pub html_path: PathBuf,
}

impl PageLayout {
    /// Resolve the layout of a page written to `output_path`.
    ///
    /// Embedded formats write `output_path` itself. Other formats write
    /// `<parent>/<stem>/<stem>.html` next to a `data/` directory, where
    /// `<stem>` is the sanitized file stem (or page title without one).
    pub fn resolve(format: DataFormat, output_path: &Path, title: &str) -> Self {
        let stem = output_path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(sanitize)
            .unwrap_or_else(|| sanitize(title));

        if format.is_embedded() {
            return Self {
                stem,
                root: None,
                html_path: output_path.to_path_buf(),
            };
        }

        let parent = output_path.parent().unwrap_or_else(|| Path::new(""));
        let root = parent.join(stem.as_str());
        let html_path = root.join(format!("{}.html", stem));
        Self {
            stem,
            root: Some(root),
            html_path,
        }
    }
}

/// Everything a page build wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageArtifact {
    /// Written HTML file.
    pub html_path: PathBuf,
    /// Output directory, for directory-style formats.
    pub root_dir: Option<PathBuf>,
    /// Data files written under `root_dir/data/`.
    pub data_files: Vec<PathBuf>,
    /// Launcher scripts, for directory-style formats.
    pub launchers: Option<Launchers>,
    /// Format the datasets were written in.
    pub format: DataFormat,
    /// Size of the HTML file.
    pub html_bytes: u64,
}

/// Result of validating a page: the DOM id of every element, in order.
#[derive(Debug, Clone)]
struct PagePlan {
    dom_ids: Vec<SafeName>,
}

/// Page builder.
#[derive(Debug, Clone, Default)]
pub struct PageBuilder {
    config: BuilderConfig,
}

impl PageBuilder {
    /// Create a new page builder with configuration.
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Check a page without writing anything.
    ///
    /// Fails on duplicate or ambiguous element ids and dataset names, and on
    /// element dependencies the page does not carry.
    pub fn validate(&self, page: &Page) -> Result<()> {
        self.plan(page).map(|_| ())
    }

    fn plan(&self, page: &Page) -> Result<PagePlan> {
        let mut datasets = IdentifierSet::new("dataset");
        for dataset in page.datasets() {
            datasets.claim(dataset.name())?;
        }

        let mut elements = IdentifierSet::new("element");
        let mut dom_ids = Vec::with_capacity(page.elements().len());
        for element in page.elements() {
            dom_ids.push(elements.claim(element.id())?);
            for dependency in element.dependencies() {
                if page.dataset(&dependency).is_none() {
                    return Err(PageError::MissingDataset {
                        element: element.id().to_string(),
                        dataset: dependency,
                    });
                }
            }
        }

        Ok(PagePlan { dom_ids })
    }

    /// Build a page at `output_path`.
    ///
    /// Validation runs before anything touches the filesystem. Directory-style
    /// formats get a `<stem>/` directory with data files and launchers.
    pub fn build(&self, page: &Page, output_path: &Path) -> Result<PageArtifact> {
        let plan = self.plan(page)?;
        let format = page.format();
        let layout = PageLayout::resolve(format, output_path, page.title());

        debug!(
            title = %page.title(),
            format = %format,
            html = %layout.html_path.display(),
            "Building page"
        );

        let destination = match &layout.root {
            Some(root) => Destination::Directory(root),
            None => Destination::Embed,
        };

        let mut locators = Vec::with_capacity(page.datasets().len());
        let mut data_files = Vec::new();
        for dataset in page.datasets() {
            self.check_embed_size(dataset, format);
            let locator = serialize(dataset, format, destination)?;
            if let (Some(root), Some(relative)) = (&layout.root, locator.relative_path()) {
                data_files.push(root.join(relative));
            }
            locators.push((dataset.name().to_string(), locator));
        }

        let html = self.render_document(page, &plan, &locators, &LinkMap::new())?;
        let html_bytes = write_html(&layout.html_path, &html)?;

        let launchers = match &layout.root {
            Some(root) => Some(emit_launchers(root, &format!("{}.html", layout.stem))?),
            None => None,
        };

        info!(
            title = %page.title(),
            format = %format,
            bytes = html_bytes,
            datasets = locators.len(),
            elements = page.elements().len(),
            "Page built"
        );

        Ok(PageArtifact {
            html_path: layout.html_path,
            root_dir: layout.root,
            data_files,
            launchers,
            format,
            html_bytes,
        })
    }

    /// Render a page to HTML without writing anything.
    ///
    /// External formats reference the paths [`PageBuilder::build`] would write.
    pub fn render(&self, page: &Page) -> Result<String> {
        let plan = self.plan(page)?;
        let format = page.format();

        let locators = page
            .datasets()
            .iter()
            .map(|dataset| {
                let locator = if format.is_embedded() {
                    self.check_embed_size(dataset, format);
                    serialize(dataset, format, Destination::Embed)?
                } else {
                    Locator::External {
                        format,
                        path: relative_data_path(dataset.name(), format),
                    }
                };
                Ok((dataset.name().to_string(), locator))
            })
            .collect::<Result<Vec<_>>>()?;

        self.render_document(page, &plan, &locators, &LinkMap::new())
    }

    /// Write a page's HTML to `html_path` using already-serialized datasets.
    ///
    /// `locators` must hold an entry for every dataset of the page; `links`
    /// rewrites link targets. Returns the bytes written.
    pub fn emit(
        &self,
        page: &Page,
        html_path: &Path,
        locators: &HashMap<String, Locator>,
        links: &LinkMap,
    ) -> Result<u64> {
        let plan = self.plan(page)?;

        let resolved = page
            .datasets()
            .iter()
            .map(|dataset| {
                locators
                    .get(dataset.name())
                    .map(|locator| (dataset.name().to_string(), locator.clone()))
                    .ok_or_else(|| {
                        PageError::Configuration(format!(
                            "no serialized location for dataset '{}'",
                            dataset.name()
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let html = self.render_document(page, &plan, &resolved, links)?;
        let bytes = write_html(html_path, &html)?;
        debug!(title = %page.title(), bytes, path = %html_path.display(), "Emitted page");
        Ok(bytes)
    }

    fn check_embed_size(&self, dataset: &Dataset, format: DataFormat) {
        if !format.is_embedded() {
            return;
        }
        let estimated = dataset.estimated_bytes();
        if estimated > self.config.embed_warn_bytes {
            warn!(
                dataset = %dataset.name(),
                estimated_bytes = estimated,
                threshold = self.config.embed_warn_bytes,
                suggested = %DataFormat::suggest(estimated),
                "Embedded dataset is large; page load will be slow"
            );
        }
    }

    fn render_document(
        &self,
        page: &Page,
        plan: &PagePlan,
        locators: &[(String, Locator)],
        links: &LinkMap,
    ) -> Result<String> {
        let config = page.config();
        let title = html_escape(&config.title);

        // Libraries: loader needs first, then every element's.
        let mut wanted: Vec<ScriptLibrary> = Vec::new();
        for (_, locator) in locators {
            wanted.extend(loader_scripts(locator.format()));
        }
        for element in page.elements() {
            wanted.extend(element.required_scripts());
        }
        let libraries = collect_scripts(wanted);
        let tags = self.config.scripts.render(&libraries);

        let mut sections = String::new();
        let mut functional = String::new();
        for (element, dom_id) in page.elements().iter().zip(&plan.dom_ids) {
            let ctx = RenderContext::new(dom_id.as_str(), links);
            sections.push_str(&format!(
                "<section class=\"tv-element tv-{kind}\" id=\"{id}\">\n<h2>{title}</h2>\n{body}\n</section>\n",
                kind = element.kind(),
                id = dom_id,
                title = html_escape(element.id()),
                body = element.appearance_fragment(&ctx),
            ));

            let script = element.functional_fragment(&ctx);
            if !script.trim().is_empty() {
                functional.push_str(&format!(
                    "(function () {{\n  try {{\n{}\n  }} catch (err) {{ console.error({}, err); }}\n}})();\n",
                    script,
                    js_string(&format!("tabviz: element {} failed", element.id()))
                ));
            }
        }

        let markers: String = locators
            .iter()
            .map(|(name, locator)| dataset_marker(name, locator) + "\n")
            .collect();

        let header = config
            .header
            .as_deref()
            .map(|h| format!("<div class=\"tv-header-text\">{}</div>", neutralize_raw_text_tags(h)))
            .unwrap_or_default();
        let notes = config
            .notes
            .as_deref()
            .map(|n| format!("<footer class=\"tv-notes\">{}</footer>", html_escape(n)))
            .unwrap_or_default();

        let html = format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<meta name="generator" content="tabviz {version}">
{styles}<style>
:root {{
    --bg-primary: #ffffff;
    --bg-secondary: #f9fafb;
    --text-primary: #111827;
    --text-secondary: #6b7280;
    --border-color: #e5e7eb;
}}
body {{
    background-color: var(--bg-primary);
    color: var(--text-primary);
    font-family: ui-sans-serif, system-ui, sans-serif;
    line-height: 1.5;
    margin: 0 auto;
    max-width: 80rem;
    padding: 2rem 1rem;
}}
.tv-element {{
    background-color: var(--bg-secondary);
    border: 1px solid var(--border-color);
    border-radius: 0.5rem;
    padding: 1.5rem;
    margin-bottom: 1rem;
}}
.tv-table {{ border-collapse: collapse; }}
.tv-table th, .tv-table td {{ border: 1px solid var(--border-color); padding: 0.25rem 0.5rem; }}
.tv-plot {{ min-height: 400px; }}
.tv-picture, .tv-slide img {{ max-width: 100%; }}
.tv-notes {{ color: var(--text-secondary); white-space: pre-wrap; }}
</style>
</head>
<body>
<header class="tv-header">
<h1>{title}</h1>
{header}
</header>
<main>
{sections}</main>
{notes}
{markers}{scripts}<script>
{loader}
</script>
<script>
{functional}</script>
</body>
</html>
"##,
            title = title,
            version = env!("CARGO_PKG_VERSION"),
            styles = tags.styles,
            header = header,
            sections = sections,
            notes = notes,
            markers = markers,
            scripts = tags.scripts,
            loader = LOADER_JS,
            functional = guard_inline_script(&functional),
        );

        Ok(self.finish(html))
    }

    fn finish(&self, html: String) -> String {
        if !self.config.minify {
            return html;
        }
        // Data markers are text/plain; leave script contents alone.
        let cfg = minify_html::Cfg {
            minify_js: false,
            minify_css: true,
            ..Default::default()
        };
        String::from_utf8(minify_html::minify(html.as_bytes(), &cfg)).unwrap_or(html)
    }
}

fn write_html(path: &Path, html: &str) -> Result<u64> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)?;
    Ok(html.len() as u64)
}
