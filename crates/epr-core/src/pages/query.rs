//! Page URL query parameters.

use url::form_urlencoded;

/// Parsed query string of a page URL (`?q=...&pkg=...`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    params: Vec<(String, String)>,
}

impl PageQuery {
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            params: form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// First value for `key`; empty values count as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decodes_values() {
        let query = PageQuery::parse("?q=aws%20cloud&pkg=nginx&prerelease=true&q=second");
        assert_eq!(query.get("q"), Some("aws cloud"));
        assert_eq!(query.get("pkg"), Some("nginx"));
        assert!(query.flag("prerelease"));
    }

    #[test]
    fn test_empty_and_missing_values() {
        let query = PageQuery::parse("q=&category=security");
        assert_eq!(query.get("q"), None);
        assert_eq!(query.get("type"), None);
        assert!(!query.flag("prerelease"));
    }
}
