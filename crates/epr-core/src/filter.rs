//! Filter/pagination engine for the browse view.
//!
//! [`apply_filters`] is a pure function of the package set and an
//! [`ActiveFilters`] value; calling it repeatedly with the same inputs
//! always yields the same page. All predicates are conjunctive.

use std::collections::BTreeSet;

use crate::package::PackageRecord;

/// Wildcard value for the owner and type predicates
pub const ALL: &str = "all";

pub const DEFAULT_ITEMS_PER_PAGE: usize = 50;

/// Filter and pagination state owned by the browse page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilters {
    /// Case-insensitive substring matched against title-or-name
    pub text: String,
    /// `"all"` or an owner type
    pub owner: String,
    /// Empty means no category constraint; otherwise any-of
    pub categories: BTreeSet<String>,
    /// `"all"` or a package type
    pub package_type: String,
    /// 1-indexed
    pub current_page: usize,
    pub items_per_page: usize,
}

/// Filter-control events dispatched by the browse page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterMessage {
    TextChanged(String),
    OwnerSelected(String),
    CategoryToggled { category: String, checked: bool },
    TypeSelected(String),
    PageSelected(usize),
}

impl Default for ActiveFilters {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS_PER_PAGE)
    }
}

impl ActiveFilters {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            text: String::new(),
            owner: ALL.to_string(),
            categories: BTreeSet::new(),
            package_type: ALL.to_string(),
            current_page: 1,
            items_per_page: items_per_page.max(1),
        }
    }

    /// Apply one filter-control event. Predicate changes invalidate the
    /// pagination position; page selection touches nothing else.
    pub fn update(&mut self, message: FilterMessage) {
        match message {
            FilterMessage::TextChanged(text) => self.text = text,
            FilterMessage::OwnerSelected(owner) => self.owner = owner,
            FilterMessage::CategoryToggled { category, checked } => {
                if checked {
                    self.categories.insert(category);
                } else {
                    self.categories.remove(&category);
                }
            }
            FilterMessage::TypeSelected(package_type) => self.package_type = package_type,
            FilterMessage::PageSelected(page) => {
                self.current_page = page.max(1);
                return;
            }
        }
        self.current_page = 1;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.update(FilterMessage::TextChanged(text.into()));
    }

    pub fn set_owner(&mut self, owner: impl Into<String>) {
        self.update(FilterMessage::OwnerSelected(owner.into()));
    }

    pub fn set_category(&mut self, category: impl Into<String>, checked: bool) {
        self.update(FilterMessage::CategoryToggled {
            category: category.into(),
            checked,
        });
    }

    pub fn set_type(&mut self, package_type: impl Into<String>) {
        self.update(FilterMessage::TypeSelected(package_type.into()));
    }

    pub fn set_page(&mut self, page: usize) {
        self.update(FilterMessage::PageSelected(page));
    }

    /// True if the package satisfies every active predicate
    pub fn matches(&self, package: &PackageRecord) -> bool {
        self.text_matches(package)
            && self.category_matches(package)
            && self.owner_matches(package)
            && self.type_matches(package)
    }

    fn text_matches(&self, package: &PackageRecord) -> bool {
        matches_text(package, &self.text)
    }

    fn category_matches(&self, package: &PackageRecord) -> bool {
        self.categories.is_empty()
            || package
                .categories
                .iter()
                .any(|category| self.categories.contains(category))
    }

    fn owner_matches(&self, package: &PackageRecord) -> bool {
        self.owner == ALL || package.owner_type() == Some(self.owner.as_str())
    }

    fn type_matches(&self, package: &PackageRecord) -> bool {
        self.package_type == ALL || package.package_type() == Some(self.package_type.as_str())
    }
}

/// Case-insensitive substring match on title-or-name. An empty needle
/// matches everything.
pub fn matches_text(package: &PackageRecord, needle: &str) -> bool {
    needle.is_empty()
        || package
            .display_title()
            .to_lowercase()
            .contains(&needle.to_lowercase())
}

/// One page of the filtered sequence plus page metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredPage<'a> {
    pub items: Vec<&'a PackageRecord>,
    pub total_matched: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

impl FilteredPage<'_> {
    pub fn is_empty(&self) -> bool {
        self.total_matched == 0
    }
}

/// Filter `packages` and slice out the current page
pub fn apply_filters<'a>(
    packages: &'a [PackageRecord],
    filters: &ActiveFilters,
) -> FilteredPage<'a> {
    let matched: Vec<&PackageRecord> = packages.iter().filter(|p| filters.matches(p)).collect();
    let per_page = filters.items_per_page.max(1);
    let current_page = filters.current_page.max(1);

    let total_matched = matched.len();
    let start = (current_page - 1).saturating_mul(per_page);
    let items = matched.into_iter().skip(start).take(per_page).collect();

    FilteredPage {
        items,
        total_matched,
        total_pages: total_pages(total_matched, per_page),
        current_page,
    }
}

/// `ceil(total / per_page)`
pub fn total_pages(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page.max(1))
}
