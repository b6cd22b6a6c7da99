#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::{Value, json};
use url::Url;

use epr_core::api::{HttpResponse, RegistryClient, Transport};
use epr_core::error::{CatalogError, CatalogResult};

pub const BASE: &str = "https://epr.test/";

/// Transport answering from a fixed URL table; unknown URLs are 404
#[derive(Default)]
pub struct ScriptedTransport {
    routes: HashMap<String, CatalogResult<HttpResponse>>,
    requested: RefCell<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(mut self, path: &str, body: Value) -> Self {
        self.routes.insert(
            format!("{}{}", BASE.trim_end_matches('/'), path),
            Ok(HttpResponse::new(200, body.to_string())),
        );
        self
    }

    pub fn text(mut self, path: &str, body: &str) -> Self {
        self.routes.insert(
            format!("{}{}", BASE.trim_end_matches('/'), path),
            Ok(HttpResponse::new(200, body)),
        );
        self
    }

    pub fn status(mut self, path: &str, status: u16) -> Self {
        self.routes.insert(
            format!("{}{}", BASE.trim_end_matches('/'), path),
            Ok(HttpResponse::new(status, "")),
        );
        self
    }

    pub fn unreachable(mut self, path: &str) -> Self {
        self.routes.insert(
            format!("{}{}", BASE.trim_end_matches('/'), path),
            Err(CatalogError::Network("connection refused".into())),
        );
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url) -> CatalogResult<HttpResponse> {
        self.requested.borrow_mut().push(url.to_string());
        self.routes
            .get(url.as_str())
            .cloned()
            .unwrap_or(Ok(HttpResponse::new(404, "")))
    }
}

pub fn client(transport: ScriptedTransport) -> RegistryClient<ScriptedTransport> {
    RegistryClient::with_transport(Url::parse(BASE).unwrap(), transport)
}

pub fn record(name: &str, title: &str, categories: &[&str]) -> Value {
    json!({
        "name": name,
        "title": title,
        "version": "1.0.0",
        "description": format!("{title} integration"),
        "categories": categories,
        "owner": {"type": "elastic", "github": "elastic/integrations"},
        "type": "integration",
        "icons": [{"path": format!("/img/{name}.svg")}]
    })
}

/// Search-envelope body wrapping each record in `_source`
pub fn envelope(records: Vec<Value>) -> Value {
    let hits: Vec<Value> = records.into_iter().map(|r| json!({"_source": r})).collect();
    json!({"hits": {"hits": hits}})
}
