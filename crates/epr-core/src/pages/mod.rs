//! Page controllers.
//!
//! Each page owns its state explicitly and exposes pure update functions
//! plus an async load entry point. Frontends render the resulting view
//! models; nothing here knows about markup or terminals.

pub mod browse;
pub mod card;
pub mod detail;
pub mod home;
pub mod query;
pub mod search;

pub use browse::{BrowsePage, BrowsePreset, BrowseView, OwnerOption};
pub use card::{CardContext, CardModel};
pub use detail::{DataStreamPanel, DetailPage, DetailRequest, DetailView, SampleEvent};
pub use home::{HomePage, LaneView};
pub use query::PageQuery;
pub use search::SearchView;

/// Identifies one reload of a page's collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Monotonic reload counter. A result is only applied if it carries the
/// ticket of the latest reload; anything older is stale.
#[derive(Debug, Clone, Default)]
pub struct LoadGeneration {
    current: u64,
}

impl LoadGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new reload, invalidating all outstanding tickets
    pub fn advance(&mut self) -> LoadTicket {
        self.current += 1;
        LoadTicket(self.current)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_invalidates_previous_ticket() {
        let mut generation = LoadGeneration::new();
        let first = generation.advance();
        assert!(generation.is_current(first));

        let second = generation.advance();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }
}
