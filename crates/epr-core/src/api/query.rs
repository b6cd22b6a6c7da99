//! Search constraints and query-string construction.

use url::Url;

use crate::error::CatalogResult;
use crate::links;

/// How a search is narrowed. The registry partitions results either by
/// category or by type, never both; an exact package lookup is the third
/// option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Narrowing {
    #[default]
    None,
    Category(String),
    Type(String),
    Package(String),
}

/// Query constraints for `GET /search`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchConstraints {
    /// Kibana version the results must be compatible with
    pub kibana_version: Option<String>,
    /// Include pre-release package versions
    pub prerelease: bool,
    /// Category / type / package narrowing
    pub narrowing: Narrowing,
}

impl SearchConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.kibana_version = Some(version.into());
        self
    }

    pub fn with_prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }

    /// Narrow by category. `"all"` means no narrowing.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.narrowing = if category == "all" {
            Narrowing::None
        } else {
            Narrowing::Category(category)
        };
        self
    }

    pub fn with_type(mut self, package_type: impl Into<String>) -> Self {
        self.narrowing = Narrowing::Type(package_type.into());
        self
    }

    pub fn with_package(mut self, name: impl Into<String>) -> Self {
        self.narrowing = Narrowing::Package(name.into());
        self
    }

    /// Build the full search URL against a registry base
    pub fn to_url(&self, base: &Url) -> CatalogResult<Url> {
        let mut url = links::registry_url(base, "/search")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Narrowing::Package(name) = &self.narrowing {
                pairs.append_pair("package", name);
            }
            if let Some(version) = &self.kibana_version {
                pairs.append_pair("kibana.version", version);
            }
            match &self.narrowing {
                Narrowing::Category(category) => {
                    pairs.append_pair("category", category);
                }
                Narrowing::Type(package_type) => {
                    pairs.append_pair("type", package_type);
                }
                Narrowing::None | Narrowing::Package(_) => {}
            }
            if self.prerelease {
                pairs.append_pair("prerelease", "true");
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://epr.elastic.co/").unwrap()
    }

    #[test]
    fn test_version_and_category() {
        let url = SearchConstraints::new()
            .with_version("9.2.0")
            .with_category("security")
            .to_url(&base())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://epr.elastic.co/search?kibana.version=9.2.0&category=security"
        );
    }

    #[test]
    fn test_all_category_is_not_a_narrowing() {
        let constraints = SearchConstraints::new()
            .with_version("8.19.0")
            .with_category("all");
        assert_eq!(constraints.narrowing, Narrowing::None);
        assert_eq!(
            constraints.to_url(&base()).unwrap().as_str(),
            "https://epr.elastic.co/search?kibana.version=8.19.0"
        );
    }

    #[test]
    fn test_type_replaces_category() {
        let constraints = SearchConstraints::new()
            .with_category("security")
            .with_type("content");
        assert_eq!(constraints.narrowing, Narrowing::Type("content".into()));
    }

    #[test]
    fn test_package_lookup_with_prerelease() {
        let url = SearchConstraints::new()
            .with_package("aws bedrock")
            .with_version("9.1.0")
            .with_prerelease(true)
            .to_url(&base())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://epr.elastic.co/search?package=aws+bedrock&kibana.version=9.1.0&prerelease=true"
        );
    }

    #[test]
    fn test_no_constraints_has_no_query() {
        let url = SearchConstraints::new().to_url(&base()).unwrap();
        assert_eq!(url.as_str(), "https://epr.elastic.co/search");
    }
}
