//! EPR Core Library
//!
//! Provides the state and data layer for browsing an Elastic package
//! registry: the API client, filter/pagination engine, carousel lanes,
//! session preferences and the page controllers built on top of them.

pub mod api;
pub mod carousel;
pub mod config;
pub mod error;
pub mod filter;
pub mod links;
pub mod package;
pub mod pages;
pub mod pagination;
pub mod preferences;

/// Re-exports of commonly used types
pub mod prelude {
    // API
    pub use crate::api::{
        HttpResponse, Narrowing, RegistryClient, ReqwestTransport, SearchConstraints,
        SearchResponse, Transport,
    };

    // Errors
    pub use crate::error::{CatalogError, CatalogResult};

    // Packages
    pub use crate::package::{DataStream, Icon, Owner, PackageRecord, Screenshot};

    // Engines
    pub use crate::carousel::{CarouselController, CarouselState, Lane, LaneLayout, Step};
    pub use crate::filter::{ActiveFilters, FilterMessage, FilteredPage, apply_filters};
    pub use crate::pagination::{PageControl, page_controls};

    // Preferences and configuration
    pub use crate::config::{CatalogConfig, ConfigStore};
    pub use crate::preferences::{
        FileStorage, MemoryStorage, PreferenceStore, Preferences, SessionStorage, VersionList,
    };
}
