//! Detail page for a single package.
//!
//! The compatible version is resolved with an exact-name search, then the
//! detail endpoint, README and per-data-stream sample events are loaded.
//! Every sub-fetch has its own fallback: summary data stands in for a
//! missing detail record, a missing README renders nothing and a missing
//! sample event only affects its own panel.

use url::Url;

use crate::api::{RegistryClient, SearchConstraints, Transport};
use crate::carousel::{GalleryCarousel, Step};
use crate::error::{CatalogError, CatalogResult};
use crate::links;
use crate::package::{DataStream, PackageRecord};
use crate::pages::query::PageQuery;

/// Which package to show, from the detail URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub package: String,
    pub kibana_version: Option<String>,
    pub prerelease: bool,
}

impl DetailRequest {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            kibana_version: None,
            prerelease: false,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.kibana_version = Some(version.into());
        self
    }

    pub fn with_prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }

    /// `pkg`, `kibana_version` and `prerelease` parameters
    pub fn from_query(query: &PageQuery) -> Option<Self> {
        let package = query.get("pkg")?;
        Some(Self {
            package: package.to_string(),
            kibana_version: query.get("kibana_version").map(str::to_string),
            prerelease: query.flag("prerelease"),
        })
    }

    fn constraints(&self) -> SearchConstraints {
        let mut constraints = SearchConstraints::new()
            .with_package(&self.package)
            .with_prerelease(self.prerelease);
        if let Some(version) = &self.kibana_version {
            constraints = constraints.with_version(version);
        }
        constraints
    }
}

/// Sample event state of an expanded panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleEvent {
    /// Pretty-printed JSON
    Available(String),
    NotAvailable,
}

impl SampleEvent {
    pub fn text(&self) -> &str {
        match self {
            SampleEvent::Available(json) => json,
            SampleEvent::NotAvailable => "Sample event not available.",
        }
    }
}

/// Expandable panel for one data stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStreamPanel {
    pub heading: String,
    pub subtitle: String,
    pub dataset: String,
    sample_path: String,
    expanded: Option<SampleEvent>,
}

impl DataStreamPanel {
    fn new(package: &PackageRecord, stream: &DataStream) -> Self {
        Self {
            heading: stream.display_title().to_string(),
            subtitle: format!(
                "Type: {} | Dataset: {}",
                stream.stream_type, stream.dataset
            ),
            dataset: stream.dataset.clone(),
            sample_path: links::sample_event_path(&package.name, &package.version, &stream.dataset),
            expanded: None,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded.is_some()
    }

    pub fn sample(&self) -> Option<&SampleEvent> {
        self.expanded.as_ref()
    }

    pub fn sample_path(&self) -> &str {
        &self.sample_path
    }

    /// Expand (fetching the sample event) or collapse the panel
    pub async fn toggle<T: Transport>(&mut self, client: &RegistryClient<T>) {
        if self.expanded.take().is_some() {
            return;
        }
        let sample = match client.fetch_sample_event(&self.sample_path).await {
            Some(json) => match serde_json::to_string_pretty(&json) {
                Ok(pretty) => SampleEvent::Available(pretty),
                Err(_) => SampleEvent::NotAvailable,
            },
            None => SampleEvent::NotAvailable,
        };
        self.expanded = Some(sample);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub url: String,
    pub title: String,
}

/// Screenshot gallery with its one-image-per-view carousel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    pub images: Vec<GalleryImage>,
    pub carousel: GalleryCarousel,
}

impl Gallery {
    fn new(base: &Url, package: &PackageRecord) -> Option<Self> {
        if package.screenshots.is_empty() {
            return None;
        }
        let images = package
            .screenshots
            .iter()
            .map(|s| GalleryImage {
                url: links::screenshot_url(base, &s.path),
                title: s.title.clone().unwrap_or_default(),
            })
            .collect::<Vec<_>>();
        let carousel = GalleryCarousel::new(images.len());
        Some(Self { images, carousel })
    }

    pub fn current(&self) -> Option<&GalleryImage> {
        self.images.get(self.carousel.index())
    }

    pub fn step(&mut self, step: Step) -> bool {
        self.carousel.step(step)
    }
}

/// Fully loaded detail page
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPage {
    pub package: PackageRecord,
    /// True when the detail endpoint failed and summary data is shown
    pub from_summary: bool,
    pub icon_url: String,
    pub download_url: String,
    pub readme: Option<String>,
    pub gallery: Option<Gallery>,
    pub data_streams: Vec<DataStreamPanel>,
}

impl DetailPage {
    pub fn title(&self) -> &str {
        self.package.display_title()
    }

    pub fn version_label(&self) -> String {
        format!("v{}", self.package.version)
    }

    pub async fn toggle_panel<T: Transport>(&mut self, client: &RegistryClient<T>, index: usize) {
        if let Some(panel) = self.data_streams.get_mut(index) {
            panel.toggle(client).await;
        }
    }
}

/// What the detail container shows
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Missing,
    Loaded(Box<DetailPage>),
    Failed(String),
}

impl DetailView {
    pub fn message(&self) -> Option<&str> {
        match self {
            DetailView::Missing => Some("No integration specified."),
            DetailView::Loaded(_) => None,
            DetailView::Failed(message) => Some(message),
        }
    }
}

/// Resolve, fetch and assemble the detail page
pub async fn load_detail<T: Transport>(
    client: &RegistryClient<T>,
    request: &DetailRequest,
) -> CatalogResult<DetailPage> {
    let summary = client
        .search(&request.constraints())
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CatalogError::not_found(&request.package))?;

    let detail = client
        .fetch_detail(&request.package, &summary.version)
        .await;
    let (package, from_summary) = match detail {
        Some(detail) => (detail, false),
        None => (summary, true),
    };

    let readme = client.fetch_readme(&links::readme_path(&package)).await;
    let base = client.base_url();

    Ok(DetailPage {
        icon_url: links::icon_url(base, &package),
        download_url: links::download_url(base, &package),
        readme,
        gallery: Gallery::new(base, &package),
        data_streams: package
            .data_streams
            .iter()
            .map(|ds| DataStreamPanel::new(&package, ds))
            .collect(),
        from_summary,
        package,
    })
}

/// Page-level entry point: never fails, errors become an inline message
/// naming the requested package
pub async fn open_detail<T: Transport>(
    client: &RegistryClient<T>,
    request: Option<&DetailRequest>,
) -> DetailView {
    let Some(request) = request else {
        return DetailView::Missing;
    };
    match load_detail(client, request).await {
        Ok(page) => DetailView::Loaded(Box::new(page)),
        Err(e) => {
            tracing::error!(
                package = %request.package,
                error = %e,
                "Failed to load integration details"
            );
            DetailView::Failed(format!(
                "Could not find integration: {}. Details: {}",
                request.package, e
            ))
        }
    }
}
