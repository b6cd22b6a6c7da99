//! Card model handed to the view layer.

use serde::Serialize;
use url::Url;

use crate::links;
use crate::package::PackageRecord;
use crate::preferences::Preferences;

const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Everything a card needs besides the package itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContext {
    pub registry_url: Url,
    pub site_base_url: String,
    pub kibana_version: Option<String>,
    pub prerelease: bool,
}

impl CardContext {
    pub fn new(
        registry_url: Url,
        site_base_url: impl Into<String>,
        preferences: &Preferences,
    ) -> Self {
        Self {
            registry_url,
            site_base_url: site_base_url.into(),
            kibana_version: Some(preferences.kibana_version.clone()),
            prerelease: preferences.include_prerelease,
        }
    }
}

/// One package card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardModel {
    pub name: String,
    pub title: String,
    pub version_label: String,
    pub description: String,
    pub icon_url: String,
    pub detail_url: String,
}

impl CardModel {
    pub fn from_package(package: &PackageRecord, context: &CardContext) -> Self {
        Self {
            name: package.name.clone(),
            title: package.display_title().to_string(),
            version_label: format!("v{}", package.version),
            description: preview(&package.description),
            icon_url: links::icon_url(&context.registry_url, package),
            detail_url: links::catalog_detail_link(
                &context.site_base_url,
                &package.name,
                context.kibana_version.as_deref(),
                context.prerelease,
            ),
        }
    }
}

pub fn cards<'a, I>(packages: I, context: &CardContext) -> Vec<CardModel>
where
    I: IntoIterator<Item = &'a PackageRecord>,
{
    packages
        .into_iter()
        .map(|p| CardModel::from_package(p, context))
        .collect()
}

fn preview(description: &str) -> String {
    let head: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
    format!("{head}...")
}
