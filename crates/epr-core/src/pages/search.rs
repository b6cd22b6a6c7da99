//! Search page: version-constrained superset, filtered client-side.

use crate::api::{RegistryClient, SearchConstraints, Transport};
use crate::filter::matches_text;
use crate::pages::card::{self, CardContext, CardModel};
use crate::preferences::{PreferenceStore, SessionStorage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchView {
    /// No query given
    Prompt,
    Results { title: String, cards: Vec<CardModel> },
    Empty { title: String },
    Failed { title: String },
}

impl SearchView {
    pub fn title(&self) -> &str {
        match self {
            SearchView::Prompt => "Please enter a search term.",
            SearchView::Results { title, .. }
            | SearchView::Empty { title }
            | SearchView::Failed { title } => title,
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            SearchView::Empty { .. } => Some("No integrations found."),
            SearchView::Failed { .. } => Some("Search failed. See console for details."),
            SearchView::Prompt | SearchView::Results { .. } => None,
        }
    }

    pub fn cards(&self) -> &[CardModel] {
        match self {
            SearchView::Results { cards, .. } => cards,
            _ => &[],
        }
    }
}

/// Title for a query. The version is only named when the session stores one.
pub fn search_title(query: &str, stored_version: Option<&str>, prerelease: bool) -> String {
    let mut title = format!("Search results for \"{query}\"");
    if let Some(version) = stored_version {
        title.push_str(&format!(" (Kibana v{version})"));
    }
    if prerelease {
        title.push_str(" [Pre-releases]");
    }
    title
}

/// Run a search for `query` under the session preferences
pub async fn load_search<T, S>(
    client: &RegistryClient<T>,
    query: Option<&str>,
    store: &PreferenceStore<S>,
    context: &CardContext,
) -> SearchView
where
    T: Transport,
    S: SessionStorage,
{
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return SearchView::Prompt;
    };
    let preferences = store.load();
    let title = search_title(
        query,
        store.stored_version().as_deref(),
        preferences.include_prerelease,
    );

    let constraints = SearchConstraints::new()
        .with_version(&preferences.kibana_version)
        .with_prerelease(preferences.include_prerelease);

    match client.search(&constraints).await {
        Ok(packages) => {
            let matched: Vec<_> = packages.iter().filter(|p| matches_text(p, query)).collect();
            if matched.is_empty() {
                SearchView::Empty { title }
            } else {
                SearchView::Results {
                    title,
                    cards: card::cards(matched, context),
                }
            }
        }
        Err(e) => {
            tracing::error!(query, error = %e, "Failed to search");
            SearchView::Failed { title }
        }
    }
}
