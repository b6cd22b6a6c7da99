//! Registry API client
//!
//! Wraps the package registry's search, detail, README and sample-event
//! endpoints and normalizes every search response into an ordered
//! sequence of [`PackageRecord`](crate::package::PackageRecord)s.

pub mod client;
pub mod query;
pub mod response;

pub use client::{HttpResponse, RegistryClient, ReqwestTransport, Transport};
pub use query::{Narrowing, SearchConstraints};
pub use response::{SearchResponse, normalize};
