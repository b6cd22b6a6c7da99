//! Browse page: the full version-constrained package set, filtered and
//! paginated client-side.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::api::{RegistryClient, SearchConstraints, Transport};
use crate::error::CatalogResult;
use crate::filter::{ALL, ActiveFilters, FilterMessage, FilteredPage, apply_filters};
use crate::package::PackageRecord;
use crate::pages::card::{self, CardContext, CardModel};
use crate::pages::query::PageQuery;
use crate::pagination::{PageControl, page_controls};
use crate::preferences::Preferences;

/// Filters preselected by the page URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowsePreset {
    pub category: Option<String>,
    pub package_type: Option<String>,
    pub text: Option<String>,
}

impl BrowsePreset {
    pub fn from_query(query: &PageQuery) -> Self {
        Self {
            category: query.get("category").map(str::to_string),
            package_type: query.get("type").map(str::to_string),
            text: query.get("q").map(str::to_string),
        }
    }

    fn filters(&self, items_per_page: usize) -> ActiveFilters {
        let mut filters = ActiveFilters::new(items_per_page);
        if let Some(category) = &self.category {
            filters.categories.insert(category.clone());
        }
        if let Some(package_type) = &self.package_type {
            filters.package_type = package_type.clone();
        }
        if let Some(text) = &self.text {
            filters.text = text.clone();
        }
        filters
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerOption {
    pub value: String,
    pub label: String,
}

impl OwnerOption {
    fn new(value: &str) -> Self {
        let mut chars = value.chars();
        let label = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Self {
            value: value.to_string(),
            label,
        }
    }
}

/// Rendered browse grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseView {
    pub title: String,
    pub cards: Vec<CardModel>,
    pub message: Option<&'static str>,
    pub controls: Vec<PageControl>,
    pub total_matched: usize,
}

#[derive(Debug, Clone)]
pub struct BrowsePage {
    packages: Vec<PackageRecord>,
    filters: ActiveFilters,
    owner_options: Vec<OwnerOption>,
    category_options: Vec<String>,
}

impl BrowsePage {
    pub fn new(
        mut packages: Vec<PackageRecord>,
        preset: &BrowsePreset,
        items_per_page: usize,
    ) -> Self {
        packages.sort_by(|a, b| {
            let (a, b) = (a.display_title(), b.display_title());
            a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
        });

        let mut owner_options = vec![OwnerOption::new(ALL)];
        for owner in packages.iter().filter_map(PackageRecord::owner_type) {
            if !owner_options.iter().any(|o| o.value == owner) {
                owner_options.push(OwnerOption::new(owner));
            }
        }

        let category_options = packages
            .iter()
            .flat_map(|p| p.categories.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            filters: preset.filters(items_per_page),
            packages,
            owner_options,
            category_options,
        }
    }

    /// Sorted package set
    pub fn packages(&self) -> &[PackageRecord] {
        &self.packages
    }

    pub fn filters(&self) -> &ActiveFilters {
        &self.filters
    }

    pub fn owner_options(&self) -> &[OwnerOption] {
        &self.owner_options
    }

    pub fn category_options(&self) -> &[String] {
        &self.category_options
    }

    pub fn update(&mut self, message: FilterMessage) {
        tracing::debug!(?message, "Browse filter changed");
        self.filters.update(message);
    }

    pub fn page(&self) -> FilteredPage<'_> {
        apply_filters(&self.packages, &self.filters)
    }

    pub fn controls(&self) -> Vec<PageControl> {
        let page = self.page();
        page_controls(page.total_matched, page.current_page, self.filters.items_per_page)
    }

    pub fn title(&self, preferences: &Preferences) -> String {
        let heading = match self.filters.package_type.as_str() {
            "content" => "Dashboard & Content",
            "integration" => "Integrations",
            _ => "All Integrations",
        };
        let prerelease = if preferences.include_prerelease {
            ", Pre-releases"
        } else {
            ""
        };
        format!("{heading} (Kibana v{}{prerelease})", preferences.kibana_version)
    }

    pub fn view(&self, preferences: &Preferences, context: &CardContext) -> BrowseView {
        let page = self.page();
        BrowseView {
            title: self.title(preferences),
            message: page
                .is_empty()
                .then_some("No integrations match your filters."),
            controls: page_controls(
                page.total_matched,
                page.current_page,
                self.filters.items_per_page,
            ),
            total_matched: page.total_matched,
            cards: card::cards(page.items, context),
        }
    }
}

pub const LOAD_FAILED: &str = "Could not load integrations.";

/// Fetch every package for the session's version and build the page
pub async fn load_browse<T: Transport>(
    client: &RegistryClient<T>,
    preferences: &Preferences,
    preset: &BrowsePreset,
    items_per_page: usize,
) -> CatalogResult<BrowsePage> {
    let constraints = SearchConstraints::new()
        .with_version(&preferences.kibana_version)
        .with_prerelease(preferences.include_prerelease);
    let packages = client.search(&constraints).await.inspect_err(|e| {
        tracing::error!(error = %e, "Failed to load integrations for browse page");
    })?;
    tracing::debug!(count = packages.len(), "Loaded browse package set");
    Ok(BrowsePage::new(packages, preset, items_per_page))
}
