//! HTTP access to the package registry.
//!
//! [`RegistryClient`] owns the registry base URL and a [`Transport`].
//! `search` is the only fallible operation; the detail, README and
//! sample-event lookups degrade to `None` so callers can fall back to
//! what they already have.

use serde_json::Value;
use url::Url;

use crate::api::query::SearchConstraints;
use crate::api::response;
use crate::error::{CatalogError, CatalogResult};
use crate::links;
use crate::package::PackageRecord;

const USER_AGENT: &str = concat!("epr/", env!("CARGO_PKG_VERSION"));

/// Raw response: status plus body bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with `Fetch { status }` unless the status is 2xx
    pub fn error_for_status(self) -> CatalogResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CatalogError::Fetch {
                status: self.status,
            })
        }
    }

    pub fn json(&self) -> CatalogResult<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> CatalogResult<String> {
        String::from_utf8(self.body.clone()).map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

/// Issues GET requests. Implementations report transport failures as
/// `CatalogError::Network` and return every received status as-is.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(&self, url: &Url) -> CatalogResult<HttpResponse>;
}

/// Production transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> CatalogResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> CatalogResult<HttpResponse> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CatalogError::Network(format!("Failed to fetch {url}: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Network(format!("Failed to read body from {url}: {e}")))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

/// Registry API client
#[derive(Debug, Clone)]
pub struct RegistryClient<T = ReqwestTransport> {
    base_url: Url,
    transport: T,
}

impl RegistryClient<ReqwestTransport> {
    /// Client using the default HTTP transport
    pub fn new(base_url: Url) -> CatalogResult<Self> {
        Ok(Self::with_transport(base_url, ReqwestTransport::new()?))
    }
}

impl<T: Transport> RegistryClient<T> {
    pub fn with_transport(base_url: Url, transport: T) -> Self {
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Search the registry and normalize the result into an ordered
    /// sequence. Non-success statuses fail with `Fetch`; unrecognized
    /// response shapes yield an empty sequence.
    pub async fn search(
        &self,
        constraints: &SearchConstraints,
    ) -> CatalogResult<Vec<PackageRecord>> {
        let url = constraints.to_url(&self.base_url)?;
        tracing::debug!(%url, "Searching registry");

        let response = self.transport.get(&url).await?.error_for_status()?;
        let body = response.json()?;
        Ok(response::normalize(body))
    }

    /// Full package detail. `None` on any failure.
    pub async fn fetch_detail(&self, name: &str, version: &str) -> Option<PackageRecord> {
        let result: CatalogResult<PackageRecord> = async {
            let url = links::registry_url(&self.base_url, &links::detail_path(name, version))?;
            let response = self.transport.get(&url).await?.error_for_status()?;
            Ok(serde_json::from_slice(&response.body)?)
        }
        .await;

        match result {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    package = name,
                    version,
                    error = %e,
                    "Could not load detailed info, using summary data"
                );
                None
            }
        }
    }

    /// README markdown. `None` on any failure.
    pub async fn fetch_readme(&self, path: &str) -> Option<String> {
        let result: CatalogResult<String> = async {
            let url = links::registry_url(&self.base_url, path)?;
            self.transport.get(&url).await?.error_for_status()?.text()
        }
        .await;

        result
            .inspect_err(|e| tracing::debug!(path, error = %e, "README not available"))
            .ok()
    }

    /// Sample event JSON for a data stream. `None` on any failure.
    pub async fn fetch_sample_event(&self, path: &str) -> Option<Value> {
        let result: CatalogResult<Value> = async {
            let url = links::registry_url(&self.base_url, path)?;
            self.transport.get(&url).await?.error_for_status()?.json()
        }
        .await;

        result
            .inspect_err(|e| tracing::debug!(path, error = %e, "Sample event not available"))
            .ok()
    }
}
