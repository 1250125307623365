//! Page input model.

use std::sync::Arc;

use tv_data::{DataFormat, Dataset};

use crate::config::PageConfig;
use crate::element::VisualElement;

/// One HTML output unit: metadata, datasets by name, and ordered elements.
///
/// Datasets are looked up by [`Dataset::name`]; elements render in insertion
/// order.
#[derive(Debug, Default)]
pub struct Page {
    config: PageConfig,
    datasets: Vec<Arc<Dataset>>,
    elements: Vec<Box<dyn VisualElement>>,
}

impl Page {
    /// Create an empty page.
    pub fn new(config: PageConfig) -> Self {
        Self {
            config,
            datasets: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Add a dataset.
    pub fn with_dataset(mut self, dataset: impl Into<Arc<Dataset>>) -> Self {
        self.add_dataset(dataset);
        self
    }

    /// Add an element.
    pub fn with_element(mut self, element: impl VisualElement + 'static) -> Self {
        self.add_element(Box::new(element));
        self
    }

    /// Add a dataset.
    pub fn add_dataset(&mut self, dataset: impl Into<Arc<Dataset>>) {
        self.datasets.push(dataset.into());
    }

    /// Add a boxed element.
    pub fn add_element(&mut self, element: Box<dyn VisualElement>) {
        self.elements.push(element);
    }

    /// Page configuration.
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Page title.
    pub fn title(&self) -> &str {
        &self.config.title
    }

    /// Configured data format.
    pub fn format(&self) -> DataFormat {
        self.config.dataformat
    }

    /// Datasets in insertion order.
    pub fn datasets(&self) -> &[Arc<Dataset>] {
        &self.datasets
    }

    /// Find a dataset by name.
    pub fn dataset(&self, name: &str) -> Option<&Arc<Dataset>> {
        self.datasets.iter().find(|d| d.name() == name)
    }

    /// Elements in render order.
    pub fn elements(&self) -> &[Box<dyn VisualElement>] {
        &self.elements
    }
}
