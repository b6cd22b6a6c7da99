//! Error kinds surfaced by registry loads.
//!
//! Every page-level load catches these at its own boundary and turns them
//! into a scoped inline message; nothing here is fatal.

use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Registry answered with a non-success status
    #[error("HTTP error! status: {status}")]
    Fetch { status: u16 },

    /// Transport failure before any status was received
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("unexpected response: {0}")]
    Decode(String),

    /// A required lookup returned zero results
    #[error("No compatible version of '{name}' found.")]
    NotFound { name: String },
}

impl CatalogError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_mentions_status() {
        let err = CatalogError::Fetch { status: 503 };
        assert_eq!(err.to_string(), "HTTP error! status: 503");
    }

    #[test]
    fn not_found_mentions_package_name() {
        let err = CatalogError::not_found("nginx");
        assert!(err.to_string().contains("'nginx'"));
    }

    #[test]
    fn json_errors_become_decode_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        assert!(matches!(CatalogError::from(err), CatalogError::Decode(_)));
    }
}
