//! Home page: four independently loaded carousel lanes.
//!
//! A reload issues one [`LoadTicket`]; the four lane searches then run
//! concurrently and each completion updates only its own lane and its own
//! carousel state. Completions carrying a stale ticket are dropped, so a
//! slow response for an old version/prerelease combination never
//! overwrites newer results.

use std::cell::RefCell;
use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::api::{RegistryClient, SearchConstraints, Transport};
use crate::carousel::{CarouselController, Lane};
use crate::config::CatalogConfig;
use crate::error::CatalogResult;
use crate::package::PackageRecord;
use crate::pages::card::{self, CardContext, CardModel};
use crate::pages::{LoadGeneration, LoadTicket};
use crate::preferences::Preferences;

/// What a lane currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaneView {
    Loading { version: String },
    Loaded(Vec<CardModel>),
    Empty,
    Failed,
}

impl LaneView {
    /// Inline message for non-card states
    pub fn message(&self, lane: Lane) -> Option<String> {
        match self {
            LaneView::Loading { version } => {
                Some(format!("Loading integrations for Kibana v{version}..."))
            }
            LaneView::Loaded(_) => None,
            LaneView::Empty => Some("No integrations found in this category.".to_string()),
            LaneView::Failed => Some(format!("Could not load {lane} integrations.")),
        }
    }

    pub fn cards(&self) -> &[CardModel] {
        match self {
            LaneView::Loaded(cards) => cards,
            _ => &[],
        }
    }
}

/// Search constraints for a lane under the given preferences
pub fn lane_constraints(lane: Lane, preferences: &Preferences) -> SearchConstraints {
    let constraints = SearchConstraints::new()
        .with_version(&preferences.kibana_version)
        .with_prerelease(preferences.include_prerelease);
    match lane {
        Lane::All => constraints,
        Lane::Observability | Lane::Security => constraints.with_category(lane.as_str()),
        Lane::Content => constraints.with_type(lane.as_str()),
    }
}

/// Shuffle and keep the first `lane_size` records
pub fn sample_lane<R>(
    mut packages: Vec<PackageRecord>,
    lane_size: usize,
    rng: &mut R,
) -> Vec<PackageRecord>
where
    R: Rng + ?Sized,
{
    packages.shuffle(rng);
    packages.truncate(lane_size);
    packages
}

/// Home page state
#[derive(Debug, Clone)]
pub struct HomePage {
    generation: LoadGeneration,
    context: CardContext,
    lanes: BTreeMap<Lane, LaneView>,
    carousel: CarouselController,
    lane_size: usize,
}

impl HomePage {
    pub fn new(config: &CatalogConfig, context: CardContext) -> Self {
        let version = context.kibana_version.clone().unwrap_or_default();
        Self {
            generation: LoadGeneration::new(),
            context,
            lanes: Lane::ALL_LANES
                .iter()
                .map(|lane| (*lane, LaneView::Loading { version: version.clone() }))
                .collect(),
            carousel: CarouselController::new(config.resize_debounce()),
            lane_size: config.lane_size,
        }
    }

    pub fn lane(&self, lane: Lane) -> &LaneView {
        static NOT_LOADED: LaneView = LaneView::Empty;
        self.lanes.get(&lane).unwrap_or(&NOT_LOADED)
    }

    pub fn carousel(&self) -> &CarouselController {
        &self.carousel
    }

    pub fn carousel_mut(&mut self) -> &mut CarouselController {
        &mut self.carousel
    }

    /// Start a reload: rewind carousels, show loading messages and
    /// invalidate any reload still in flight
    pub fn begin_reload(&mut self, preferences: &Preferences) -> LoadTicket {
        self.context.kibana_version = Some(preferences.kibana_version.clone());
        self.context.prerelease = preferences.include_prerelease;
        self.carousel.rewind_all();
        for view in self.lanes.values_mut() {
            *view = LaneView::Loading {
                version: preferences.kibana_version.clone(),
            };
        }
        self.generation.advance()
    }

    /// Apply one lane's completed search. Returns false when the ticket
    /// is stale and the result was discarded.
    pub fn apply<R>(
        &mut self,
        ticket: LoadTicket,
        lane: Lane,
        result: CatalogResult<Vec<PackageRecord>>,
        rng: &mut R,
    ) -> bool
    where
        R: Rng + ?Sized,
    {
        if !self.generation.is_current(ticket) {
            tracing::debug!(%lane, "Discarding stale lane response");
            return false;
        }

        let view = match result {
            Ok(packages) => {
                let sampled = sample_lane(packages, self.lane_size, rng);
                self.carousel.reset(lane, sampled.len());
                if sampled.is_empty() {
                    LaneView::Empty
                } else {
                    LaneView::Loaded(card::cards(&sampled, &self.context))
                }
            }
            Err(e) => {
                tracing::error!(%lane, error = %e, "Failed to load lane");
                self.carousel.reset(lane, 0);
                LaneView::Failed
            }
        };
        self.lanes.insert(lane, view);
        true
    }
}

/// Reload every lane concurrently. Each lane is applied as soon as its own
/// search completes.
pub async fn load_home<T, R>(
    page: &mut HomePage,
    client: &RegistryClient<T>,
    preferences: &Preferences,
    rng: &mut R,
) where
    T: Transport,
    R: Rng + ?Sized,
{
    let ticket = page.begin_reload(preferences);
    let page = RefCell::new(page);
    let rng = RefCell::new(rng);

    let load = |lane: Lane| {
        let page = &page;
        let rng = &rng;
        async move {
            let result = client.search(&lane_constraints(lane, preferences)).await;
            let mut rng = rng.borrow_mut();
            page.borrow_mut().apply(ticket, lane, result, &mut **rng);
        }
    };

    tokio::join!(
        load(Lane::All),
        load(Lane::Observability),
        load(Lane::Security),
        load(Lane::Content),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use url::Url;

    fn prefs(version: &str) -> Preferences {
        Preferences {
            kibana_version: version.into(),
            include_prerelease: false,
        }
    }

    fn page() -> HomePage {
        let config = CatalogConfig::default();
        let base = Url::parse("https://epr.test/").unwrap();
        let context = CardContext::new(base, "/", &prefs("9.2.0"));
        HomePage::new(&config, context)
    }

    fn packages(n: usize) -> Vec<PackageRecord> {
        (0..n)
            .map(|i| PackageRecord::new(format!("pkg{i}"), "1.0.0"))
            .collect()
    }

    #[test]
    fn test_lane_constraints() {
        let p = prefs("9.0.0");
        assert_eq!(
            lane_constraints(Lane::Security, &p),
            SearchConstraints::new()
                .with_version("9.0.0")
                .with_category("security")
        );
        assert_eq!(
            lane_constraints(Lane::Content, &p),
            SearchConstraints::new()
                .with_version("9.0.0")
                .with_type("content")
        );
        assert_eq!(
            lane_constraints(Lane::All, &p),
            SearchConstraints::new().with_version("9.0.0")
        );
    }

    #[test]
    fn test_sample_lane_keeps_membership() {
        let mut rng = StdRng::seed_from_u64(7);
        let sampled = sample_lane(packages(25), 10, &mut rng);
        assert_eq!(sampled.len(), 10);
        let mut names: Vec<_> = sampled.iter().map(|p| p.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 10);
        assert!(names.iter().all(|n| n.starts_with("pkg")));
    }

    #[test]
    fn test_apply_resets_carousel_and_loads_cards() {
        let mut page = page();
        let mut rng = StdRng::seed_from_u64(1);
        let ticket = page.begin_reload(&prefs("9.2.0"));

        assert!(page.apply(ticket, Lane::Security, Ok(packages(12)), &mut rng));
        assert_eq!(page.lane(Lane::Security).cards().len(), 10);
        assert_eq!(page.carousel().state(Lane::Security).max, 10);
        assert_eq!(page.carousel().state(Lane::Security).index, 0);
    }

    #[test]
    fn test_lane_messages() {
        let mut page = page();
        let mut rng = StdRng::seed_from_u64(1);
        let ticket = page.begin_reload(&prefs("8.19.0"));
        assert_eq!(
            page.lane(Lane::All).message(Lane::All).as_deref(),
            Some("Loading integrations for Kibana v8.19.0...")
        );

        page.apply(ticket, Lane::Content, Ok(Vec::new()), &mut rng);
        page.apply(
            ticket,
            Lane::Observability,
            Err(CatalogError::Fetch { status: 500 }),
            &mut rng,
        );
        assert_eq!(
            page.lane(Lane::Content).message(Lane::Content).as_deref(),
            Some("No integrations found in this category.")
        );
        assert_eq!(
            page.lane(Lane::Observability)
                .message(Lane::Observability)
                .as_deref(),
            Some("Could not load observability integrations.")
        );
        // Siblings are untouched by a failed lane
        assert!(matches!(page.lane(Lane::All), LaneView::Loading { .. }));
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut page = page();
        let mut rng = StdRng::seed_from_u64(1);
        let stale = page.begin_reload(&prefs("9.1.0"));
        let fresh = page.begin_reload(&prefs("9.2.0"));

        assert!(!page.apply(stale, Lane::All, Ok(packages(3)), &mut rng));
        assert!(matches!(page.lane(Lane::All), LaneView::Loading { .. }));

        assert!(page.apply(fresh, Lane::All, Ok(packages(3)), &mut rng));
        let cards = page.lane(Lane::All).cards();
        assert_eq!(cards.len(), 3);
        assert!(cards[0].detail_url.contains("kibana_version=9.2.0"));
    }
}
