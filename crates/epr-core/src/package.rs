//! Package records as returned by the registry search and detail endpoints.
//!
//! Records are read-only once decoded. Only the fields the catalog consumes
//! are modelled; everything else in the upstream payload is ignored.

use serde::{Deserialize, Serialize};

/// One package from the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Package name (identifier)
    pub name: String,

    /// Human-readable title
    #[serde(default)]
    pub title: Option<String>,

    /// Package version, displayed as-is
    #[serde(default)]
    pub version: String,

    /// Package description
    #[serde(default)]
    pub description: String,

    /// Icons, the first one is used for cards
    #[serde(default)]
    pub icons: Vec<Icon>,

    /// Categories for filtering
    #[serde(default)]
    pub categories: Vec<String>,

    /// Publisher classification
    #[serde(default)]
    pub owner: Option<Owner>,

    /// Package type ("integration", "content", ...)
    #[serde(default, rename = "type")]
    pub package_type: Option<String>,

    /// Screenshots shown in the detail gallery
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,

    /// Data streams shipped with the package
    #[serde(default)]
    pub data_streams: Vec<DataStream>,

    /// Path to the README, relative to the registry root
    #[serde(default)]
    pub readme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default, rename = "type")]
    pub owner_type: Option<String>,

    #[serde(default)]
    pub github: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataStream {
    #[serde(default)]
    pub title: Option<String>,

    pub dataset: String,

    #[serde(default, rename = "type")]
    pub stream_type: String,
}

impl PackageRecord {
    /// Minimal record, mostly useful for tests and fixtures.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            version: version.into(),
            description: String::new(),
            icons: Vec::new(),
            categories: Vec::new(),
            owner: None,
            package_type: None,
            screenshots: Vec::new(),
            data_streams: Vec::new(),
            readme: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_owner(mut self, owner_type: impl Into<String>) -> Self {
        self.owner = Some(Owner {
            owner_type: Some(owner_type.into()),
            github: None,
        });
        self
    }

    pub fn with_type(mut self, package_type: impl Into<String>) -> Self {
        self.package_type = Some(package_type.into());
        self
    }

    /// Title if present and non-empty, otherwise the name
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => &self.name,
        }
    }

    pub fn owner_type(&self) -> Option<&str> {
        self.owner
            .as_ref()
            .and_then(|o| o.owner_type.as_deref())
            .filter(|t| !t.is_empty())
    }

    pub fn package_type(&self) -> Option<&str> {
        self.package_type.as_deref()
    }
}

impl DataStream {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => &self.dataset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_summary_record() {
        let json = r#"{
            "name": "nginx",
            "title": "Nginx",
            "version": "1.20.0",
            "description": "Collect logs and metrics from Nginx",
            "type": "integration",
            "icons": [{"src": "/img/logo.svg", "path": "/package/nginx/1.20.0/img/logo.svg"}],
            "categories": ["web", "observability"],
            "owner": {"github": "elastic/obs-infraobs-integrations", "type": "elastic"}
        }"#;

        let record: PackageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.display_title(), "Nginx");
        assert_eq!(record.owner_type(), Some("elastic"));
        assert_eq!(record.package_type(), Some("integration"));
        assert_eq!(record.icons[0].path, "/package/nginx/1.20.0/img/logo.svg");
        assert!(record.screenshots.is_empty());
    }

    #[test]
    fn test_missing_title_falls_back_to_name() {
        let record = PackageRecord::new("apache", "1.0.0");
        assert_eq!(record.display_title(), "apache");

        let record = PackageRecord::new("apache", "1.0.0").with_title("");
        assert_eq!(record.display_title(), "apache");
    }

    #[test]
    fn test_data_stream_title_fallback() {
        let ds: DataStream =
            serde_json::from_str(r#"{"dataset": "nginx.access", "type": "logs"}"#).unwrap();
        assert_eq!(ds.display_title(), "nginx.access");
        assert_eq!(ds.stream_type, "logs");
    }

    #[test]
    fn test_record_without_name_is_rejected() {
        let result = serde_json::from_str::<PackageRecord>(r#"{"version": "1.0.0"}"#);
        assert!(result.is_err());
    }
}
