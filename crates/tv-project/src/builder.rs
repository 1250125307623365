//! Project builder: validate every page, write shared data once, then emit
//! the pages side by side.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};
use tv_data::{
    sanitize, serialize, DataFormat, Dataset, DatasetSchema, Destination, IdentifierError,
    IdentifierSet, Locator, SafeName,
};
use tv_page::{
    emit_launchers, BuilderConfig, Launchers, LinkMap, Page, PageBuilder, BAT_LAUNCHER,
    SH_LAUNCHER,
};

use crate::error::{ProjectError, Result};
use crate::manifest::{DatasetEntry, FileEntry, ProjectManifest};
use crate::project::Project;

/// Label used for the cover page in errors and the manifest.
pub const COVER_LABEL: &str = "cover";

/// File name of the `index`-th sub-page (1-based).
pub fn page_file_name(index: usize) -> String {
    format!("page_{}.html", index)
}

/// Where a project's files go.
///
/// Every page sits directly in `root`; there are no per-page directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Sanitized base name.
    pub stem: SafeName,
    /// Project directory.
    pub root: PathBuf,
    /// Cover page file name.
    pub cover_file: String,
    /// Sub-page file names, in order.
    pub page_files: Vec<String>,
}

impl ProjectLayout {
    /// Resolve the layout of a project written to `output_path`.
    ///
    /// The project directory is `<parent>/<stem>/` where `<stem>` is the
    /// sanitized file stem (or the cover title without one).
    pub fn resolve(output_path: &Path, title: &str, pages: usize) -> Self {
        let stem = output_path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(sanitize)
            .unwrap_or_else(|| sanitize(title));
        let parent = output_path.parent().unwrap_or_else(|| Path::new(""));
        Self {
            root: parent.join(stem.as_str()),
            cover_file: format!("{}.html", stem),
            page_files: (1..=pages).map(page_file_name).collect(),
            stem,
        }
    }

    /// Map from link targets to the files they name.
    ///
    /// Positional names (`page_2`, `page_2.html`), the cover stem, and each
    /// page's slug with and without `.html` all resolve to the assigned file.
    /// An alias already bound to another page's file is rejected.
    fn link_map(&self, project: &Project) -> Result<LinkMap> {
        let mut names = IdentifierSet::new("page");
        let mut aliases = LinkAliases::default();

        let files = std::iter::once(&self.cover_file).chain(&self.page_files);
        for file in files.clone() {
            let base = file.trim_end_matches(".html");
            names.claim(base)?;
            aliases.bind(base, file)?;
            aliases.bind(file, file)?;
        }

        let pages = std::iter::once(project.cover()).chain(project.pages());
        for (page, file) in pages.zip(files) {
            let slug = page_slug(page);
            let own = file.trim_end_matches(".html");
            let safe = sanitize(slug);
            if !safe.as_str().eq_ignore_ascii_case(own) {
                names.claim(slug)?;
            }
            for alias in [slug, safe.as_str()] {
                aliases.bind(alias, file)?;
                aliases.bind(&format!("{}.html", alias), file)?;
            }
        }

        aliases.bind_if_vacant(COVER_LABEL, &self.cover_file);
        Ok(aliases.into_link_map())
    }
}

/// Link aliases collected before the [`LinkMap`] is built.
#[derive(Debug, Default)]
struct LinkAliases {
    targets: HashMap<String, String>,
}

impl LinkAliases {
    /// Bind `alias` to `file`; rebinding it to a different file is ambiguous.
    fn bind(&mut self, alias: &str, file: &str) -> Result<()> {
        match self.targets.get(alias) {
            Some(existing) if existing != file => Err(IdentifierError::Ambiguous {
                kind: "page link",
                first: existing.clone(),
                second: file.to_string(),
                sanitized: alias.to_string(),
            }
            .into()),
            Some(_) => Ok(()),
            None => {
                self.targets.insert(alias.to_string(), file.to_string());
                Ok(())
            }
        }
    }

    fn bind_if_vacant(&mut self, alias: &str, file: &str) {
        self.targets
            .entry(alias.to_string())
            .or_insert_with(|| file.to_string());
    }

    fn into_link_map(self) -> LinkMap {
        let mut links = LinkMap::new();
        for (alias, file) in self.targets {
            links.insert(alias, file);
        }
        links
    }
}

/// The name other pages use to link to `page`: its slug, or its title.
fn page_slug(page: &Page) -> &str {
    page.config().slug.as_deref().unwrap_or_else(|| page.title())
}

/// Everything a project build wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectArtifact {
    /// Project directory.
    pub root_dir: PathBuf,
    /// Cover page.
    pub cover_path: PathBuf,
    /// Sub-pages, in order.
    pub page_paths: Vec<PathBuf>,
    /// Data files under `root_dir/data/`, each written once.
    pub data_files: Vec<PathBuf>,
    /// Launchers at the project root, opening the cover page.
    pub launchers: Launchers,
    /// Checksums of every written file.
    pub manifest: ProjectManifest,
}

/// One dataset name as seen across the whole project.
#[derive(Debug)]
struct SharedDataset<'a> {
    dataset: &'a Arc<Dataset>,
    schema: DatasetSchema,
    fingerprint: String,
    first_page: String,
}

/// Result of validating a project.
#[derive(Debug)]
struct ProjectPlan<'a> {
    layout: ProjectLayout,
    links: LinkMap,
    datasets: HashMap<&'a str, SharedDataset<'a>>,
}

/// Project builder.
#[derive(Debug, Clone, Default)]
pub struct ProjectBuilder {
    pages: PageBuilder,
}

impl ProjectBuilder {
    /// Create a new project builder; `config` applies to every page.
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            pages: PageBuilder::new(config),
        }
    }

    /// The builder each page is emitted with.
    pub fn page_builder(&self) -> &PageBuilder {
        &self.pages
    }

    /// Check a project without writing anything.
    pub fn validate(&self, project: &Project, output_path: &Path) -> Result<()> {
        self.plan(project, output_path).map(|_| ())
    }

    fn plan<'a>(&self, project: &'a Project, output_path: &Path) -> Result<ProjectPlan<'a>> {
        let layout = ProjectLayout::resolve(output_path, project.title(), project.pages().len());

        for (label, page) in labeled_pages(project) {
            self.pages
                .validate(page)
                .map_err(|e| ProjectError::page(label, e))?;
        }

        let links = layout.link_map(project)?;

        let mut datasets: HashMap<&str, SharedDataset<'_>> = HashMap::new();
        let mut stems = IdentifierSet::new("dataset");
        for (label, page) in labeled_pages(project) {
            for dataset in page.datasets() {
                match datasets.get(dataset.name()) {
                    None => {
                        stems.claim(dataset.name())?;
                        datasets.insert(
                            dataset.name(),
                            SharedDataset {
                                dataset,
                                schema: dataset.schema(),
                                fingerprint: dataset.fingerprint(),
                                first_page: label.clone(),
                            },
                        );
                    }
                    Some(shared) => check_same_dataset(shared, dataset, &label)?,
                }
            }
        }

        Ok(ProjectPlan {
            layout,
            links,
            datasets,
        })
    }

    /// Build a project rooted at `<parent of output_path>/<stem>/`.
    ///
    /// Every page, slug and shared dataset is checked before anything is
    /// written. Each dataset is then serialized once per format and every
    /// page referencing it points at that one location.
    pub fn build(&self, project: &Project, output_path: &Path) -> Result<ProjectArtifact> {
        let plan = self.plan(project, output_path)?;
        let layout = &plan.layout;
        let root = layout.root.as_path();

        debug!(
            title = %project.title(),
            pages = project.pages().len(),
            datasets = plan.datasets.len(),
            root = %root.display(),
            "Building project"
        );
        fs::create_dir_all(root)?;

        let mut written: HashMap<(&str, DataFormat), Locator> = HashMap::new();
        let mut dataset_entries: Vec<DatasetEntry> = Vec::new();
        let mut data_files: Vec<PathBuf> = Vec::new();

        let files = std::iter::once(&layout.cover_file).chain(&layout.page_files);
        for ((label, page), file) in labeled_pages(project).zip(files) {
            let format = project.format_for(page);
            let mut locators = HashMap::with_capacity(page.datasets().len());

            for dataset in page.datasets() {
                let key = (dataset.name(), format);
                let locator = match written.get(&key) {
                    Some(locator) => {
                        debug!(dataset = %dataset.name(), page = %label, "Reusing serialized dataset");
                        locator.clone()
                    }
                    None => {
                        let locator = serialize(dataset, format, Destination::Directory(root))?;
                        if let Some(relative) = locator.relative_path() {
                            data_files.push(root.join(relative));
                        }
                        dataset_entries.push(DatasetEntry {
                            name: dataset.name().to_string(),
                            format,
                            path: locator.relative_path().map(str::to_string),
                            fingerprint: plan
                                .datasets
                                .get(dataset.name())
                                .map(|shared| shared.fingerprint.clone())
                                .unwrap_or_else(|| dataset.fingerprint()),
                            rows: dataset.num_rows(),
                            pages: Vec::new(),
                        });
                        written.insert(key, locator.clone());
                        locator
                    }
                };
                if let Some(entry) = dataset_entries
                    .iter_mut()
                    .find(|e| e.name == dataset.name() && e.format == format)
                {
                    entry.pages.push(file.clone());
                }
                locators.insert(dataset.name().to_string(), locator);
            }

            self.pages
                .emit(page, &root.join(file), &locators, &plan.links)
                .map_err(|e| ProjectError::page(label, e))?;
        }

        let launchers = emit_launchers(root, &layout.cover_file)
            .map_err(|e| ProjectError::page(COVER_LABEL, e))?;

        let mut manifest = ProjectManifest::new(project.title(), layout.cover_file.as_str());
        manifest.pages = layout.page_files.clone();
        manifest.datasets = dataset_entries;
        let relative_files = std::iter::once(layout.cover_file.clone())
            .chain(layout.page_files.iter().cloned())
            .chain(manifest.datasets.iter().filter_map(|d| d.path.clone()))
            .chain([SH_LAUNCHER.to_string(), BAT_LAUNCHER.to_string()])
            .collect::<Vec<_>>();
        for relative in &relative_files {
            manifest.add_file(FileEntry::from_file(root, relative)?);
        }
        manifest.sort_files();

        if project.config().write_manifest {
            let bytes = manifest.write_to(root)?;
            debug!(bytes, "Wrote project manifest");
        }

        info!(
            title = %project.title(),
            root = %root.display(),
            pages = project.pages().len() + 1,
            datasets = manifest.datasets.len(),
            files = manifest.file_count(),
            bytes = manifest.total_bytes(),
            "Project built"
        );

        Ok(ProjectArtifact {
            root_dir: layout.root.clone(),
            cover_path: root.join(&layout.cover_file),
            page_paths: layout.page_files.iter().map(|f| root.join(f)).collect(),
            data_files,
            launchers,
            manifest,
        })
    }
}

/// Cover then sub-pages, each with its label for errors.
fn labeled_pages(project: &Project) -> impl Iterator<Item = (String, &Page)> {
    std::iter::once((COVER_LABEL.to_string(), project.cover())).chain(
        project
            .pages()
            .iter()
            .enumerate()
            .map(|(i, page)| (format!("page_{}", i + 1), page)),
    )
}

/// Two datasets sharing a name must be the same table.
fn check_same_dataset(shared: &SharedDataset<'_>, dataset: &Arc<Dataset>, page: &str) -> Result<()> {
    if Arc::ptr_eq(shared.dataset, dataset) {
        return Ok(());
    }
    let conflict = |detail: String| ProjectError::SchemaConflict {
        dataset: dataset.name().to_string(),
        first_page: shared.first_page.clone(),
        second_page: page.to_string(),
        detail,
    };
    if let Some(detail) = shared.schema.describe_difference(&dataset.schema()) {
        return Err(conflict(detail));
    }
    if shared.fingerprint != dataset.fingerprint() {
        return Err(conflict("same columns but different contents".to_string()));
    }
    Ok(())
}
