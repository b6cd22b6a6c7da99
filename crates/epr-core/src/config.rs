//! Catalog configuration loaded from `epr.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::filter::DEFAULT_ITEMS_PER_PAGE;
use crate::preferences::VersionList;

pub const DEFAULT_REGISTRY_URL: &str = "https://epr.elastic.co/";
pub const DEFAULT_LANE_SIZE: usize = 10;
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 200;

/// Catalog configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Package registry base URL
    pub registry_url: String,

    /// Prefix for links to the catalog's own pages
    pub site_base_url: String,

    /// Browse page size
    pub items_per_page: usize,

    /// Cards sampled into each home lane
    pub lane_size: usize,

    /// Quiet period before carousels are recomputed after a resize
    pub resize_debounce_ms: u64,

    /// Override of the supported Kibana versions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<String>>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            site_base_url: "/".to_string(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            lane_size: DEFAULT_LANE_SIZE,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            versions: None,
        }
    }
}

impl CatalogConfig {
    /// Parsed registry base URL
    pub fn registry_base(&self) -> anyhow::Result<Url> {
        Url::parse(&self.registry_url)
            .with_context(|| format!("Invalid registry_url: {}", self.registry_url))
    }

    pub fn version_list(&self) -> VersionList {
        match &self.versions {
            Some(versions) => VersionList::new(versions),
            None => VersionList::builtin(),
        }
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Validate ranges that would make the engines degenerate
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.items_per_page == 0 {
            anyhow::bail!("items_per_page must be at least 1");
        }
        if self.lane_size == 0 {
            anyhow::bail!("lane_size must be at least 1");
        }
        if !matches!(self.registry_base()?.scheme(), "http" | "https") {
            anyhow::bail!(
                "registry_url must be an http(s) URL, got '{}'",
                self.registry_url
            );
        }
        Ok(())
    }
}

/// Loads and saves `epr.toml`
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn with_defaults() -> anyhow::Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("epr");
        Ok(Self::from_path(config_dir.join("epr.toml")))
    }

    pub fn from_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> anyhow::Result<CatalogConfig> {
        if !self.config_path.exists() {
            return Ok(CatalogConfig::default());
        }
        let content = std::fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;
        let config: CatalogConfig = toml::from_str(&content).with_context(|| {
            format!("Failed to parse config file: {}", self.config_path.display())
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &CatalogConfig) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CatalogConfig = toml::from_str("items_per_page = 25").unwrap();
        assert_eq!(config.items_per_page, 25);
        assert_eq!(config.lane_size, DEFAULT_LANE_SIZE);
        assert_eq!(config.registry_base().unwrap().as_str(), DEFAULT_REGISTRY_URL);
        assert_eq!(config.resize_debounce(), Duration::from_millis(200));
    }

    #[test]
    fn test_version_override() {
        let config: CatalogConfig =
            toml::from_str(r#"versions = ["8.18.0", "9.1.0"]"#).unwrap();
        assert_eq!(config.version_list().newest(), "9.1.0");
        assert_eq!(
            CatalogConfig::default().version_list(),
            VersionList::builtin()
        );
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let config = CatalogConfig {
            items_per_page: 0,
            ..CatalogConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_registry() {
        let config = CatalogConfig {
            registry_url: "file:///tmp/registry".to_string(),
            ..CatalogConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unparsable_registry() {
        let config = CatalogConfig {
            registry_url: "not a url".to_string(),
            ..CatalogConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
