//! Application state and update logic (TEA pattern)
//!
//! [`App::update`] is synchronous and never touches the network. Anything
//! that needs the registry is returned as an [`Action`] for the runner to
//! perform, and the result is fed back through the `*_loaded` methods.

use std::collections::BTreeMap;
use std::time::Instant;

use url::Url;

use epr_core::carousel::{Lane, LaneLayout, LanePosition, Step};
use epr_core::config::CatalogConfig;
use epr_core::error::CatalogResult;
use epr_core::filter::{ALL, FilterMessage};
use epr_core::pages::browse::BrowsePage;
use epr_core::pages::detail::{DetailRequest, DetailView};
use epr_core::pages::{CardContext, CardModel, HomePage};
use epr_core::preferences::{PreferenceStore, Preferences, SessionStorage};

/// Terminal columns taken by one lane card
pub const CARD_WIDTH: u16 = 28;
/// Columns between two lane cards
pub const CARD_GAP: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Browse,
    Detail,
}

/// All possible messages in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Quit,
    ShowHome,
    ShowBrowse,
    /// Leave the detail view
    Back,
    /// Terminal resized to this many columns
    Resize(u16),
    /// Periodic tick, drives the resize debounce
    Tick,

    // Preferences
    CycleVersion,
    TogglePrerelease,

    // Home
    NextLane,
    StepLane(Step),

    /// Open the card under the cursor
    OpenSelected,

    // Browse
    BeginTextEdit,
    EndTextEdit,
    TextInput(char),
    TextBackspace,
    CycleOwner,
    CycleType,
    MoveCategoryCursor(isize),
    ToggleCategory,
    MoveCardCursor(isize),
    PageUp,
    PageDown,

    // Detail
    Gallery(Step),
    MovePanelCursor(isize),
    TogglePanel,
}

/// Work the runner performs against the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoadHome,
    LoadBrowse,
    OpenDetail(DetailRequest),
    TogglePanel(usize),
}

pub struct App<S> {
    config: CatalogConfig,
    registry_url: Url,
    preferences: PreferenceStore<S>,

    pub view: View,
    pub should_quit: bool,
    pub status: String,

    // Home
    home: HomePage,
    home_loaded: bool,
    pub selected_lane: Lane,
    positions: BTreeMap<Lane, LanePosition>,
    viewport_width: u16,

    // Browse
    browse: Option<BrowsePage>,
    pub browse_error: Option<&'static str>,
    pub editing_text: bool,
    pub category_cursor: usize,
    pub card_cursor: usize,

    // Detail
    detail: Option<DetailView>,
    return_to: View,
    pub panel_cursor: usize,
}

impl<S: SessionStorage> App<S> {
    pub fn new(
        config: CatalogConfig,
        registry_url: Url,
        preferences: PreferenceStore<S>,
        width: u16,
    ) -> Self {
        let context = CardContext::new(
            registry_url.clone(),
            &config.site_base_url,
            &preferences.load(),
        );
        let home = HomePage::new(&config, context);
        Self {
            config,
            registry_url,
            preferences,
            view: View::Home,
            should_quit: false,
            status: String::new(),
            home,
            home_loaded: false,
            selected_lane: Lane::All,
            positions: BTreeMap::new(),
            viewport_width: width,
            browse: None,
            browse_error: None,
            editing_text: false,
            category_cursor: 0,
            card_cursor: 0,
            detail: None,
            return_to: View::Home,
            panel_cursor: 0,
        }
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences.load()
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn card_context(&self) -> CardContext {
        CardContext::new(
            self.registry_url.clone(),
            &self.config.site_base_url,
            &self.preferences(),
        )
    }

    pub fn home(&self) -> &HomePage {
        &self.home
    }

    pub fn home_mut(&mut self) -> &mut HomePage {
        &mut self.home
    }

    /// Last computed offset of a lane
    pub fn lane_position(&self, lane: Lane) -> Option<&LanePosition> {
        self.positions.get(&lane)
    }

    pub fn browse(&self) -> Option<&BrowsePage> {
        self.browse.as_ref()
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    pub fn detail_mut(&mut self) -> Option<&mut DetailView> {
        self.detail.as_mut()
    }

    /// Action to run before the first frame
    pub fn startup(&mut self) -> Action {
        self.status = "Loading integrations...".to_string();
        Action::LoadHome
    }

    pub fn update(&mut self, message: Message, now: Instant) -> Option<Action> {
        match message {
            Message::Quit => {
                self.should_quit = true;
                None
            }
            Message::ShowHome => {
                self.view = View::Home;
                (!self.home_loaded).then_some(Action::LoadHome)
            }
            Message::ShowBrowse => {
                self.view = View::Browse;
                if self.browse.is_none() {
                    self.status = "Loading integrations...".to_string();
                    Some(Action::LoadBrowse)
                } else {
                    None
                }
            }
            Message::Back => {
                if self.view == View::Detail {
                    self.view = self.return_to;
                }
                None
            }
            Message::Resize(width) => {
                self.viewport_width = width;
                self.measure_lanes();
                self.home.carousel_mut().on_resize(now);
                None
            }
            Message::Tick => {
                for (lane, position) in self.home.carousel_mut().poll_resize(now) {
                    self.positions.insert(lane, position);
                }
                None
            }
            Message::CycleVersion => {
                let next = self
                    .preferences
                    .versions()
                    .cycle(&self.preferences().kibana_version)
                    .to_string();
                self.apply_preference(|store| store.set_version(&next))
            }
            Message::TogglePrerelease => {
                let include = !self.preferences().include_prerelease;
                self.apply_preference(|store| store.set_prerelease(include))
            }
            Message::NextLane => {
                let lanes = Lane::ALL_LANES;
                let current = lanes.iter().position(|l| *l == self.selected_lane).unwrap_or(0);
                self.selected_lane = lanes[(current + 1) % lanes.len()];
                None
            }
            Message::StepLane(step) => {
                if let Some(position) = self.home.carousel_mut().step(self.selected_lane, step) {
                    self.positions.insert(self.selected_lane, position);
                }
                None
            }
            Message::OpenSelected => self.open_selected(),
            Message::BeginTextEdit => {
                self.editing_text = self.view == View::Browse && self.browse.is_some();
                None
            }
            Message::EndTextEdit => {
                self.editing_text = false;
                None
            }
            Message::TextInput(c) => {
                let text = self.browse.as_ref().map(|b| format!("{}{}", b.filters().text, c));
                if let Some(text) = text {
                    self.filter(FilterMessage::TextChanged(text));
                }
                None
            }
            Message::TextBackspace => {
                let text = self.browse.as_ref().map(|b| {
                    let mut text = b.filters().text.clone();
                    text.pop();
                    text
                });
                if let Some(text) = text {
                    self.filter(FilterMessage::TextChanged(text));
                }
                None
            }
            Message::CycleOwner => {
                if let Some(browse) = &self.browse {
                    let options: Vec<&str> =
                        browse.owner_options().iter().map(|o| o.value.as_str()).collect();
                    let next = cycle_option(&options, &browse.filters().owner);
                    self.filter(FilterMessage::OwnerSelected(next));
                }
                None
            }
            Message::CycleType => {
                if let Some(browse) = &self.browse {
                    let options = type_options(browse);
                    let options: Vec<&str> = options.iter().map(String::as_str).collect();
                    let next = cycle_option(&options, &browse.filters().package_type);
                    self.filter(FilterMessage::TypeSelected(next));
                }
                None
            }
            Message::MoveCategoryCursor(delta) => {
                let len = self.browse.as_ref().map_or(0, |b| b.category_options().len());
                self.category_cursor = move_cursor(self.category_cursor, delta, len);
                None
            }
            Message::ToggleCategory => {
                let toggle = self.browse.as_ref().and_then(|b| {
                    let category = b.category_options().get(self.category_cursor)?.clone();
                    let checked = !b.filters().categories.contains(&category);
                    Some(FilterMessage::CategoryToggled { category, checked })
                });
                if let Some(message) = toggle {
                    self.filter(message);
                }
                None
            }
            Message::MoveCardCursor(delta) => {
                let len = self.browse.as_ref().map_or(0, |b| b.page().items.len());
                self.card_cursor = move_cursor(self.card_cursor, delta, len);
                None
            }
            Message::PageUp | Message::PageDown => {
                let target = self.browse.as_ref().and_then(|b| {
                    let page = b.page();
                    match message {
                        Message::PageUp if page.current_page > 1 => Some(page.current_page - 1),
                        Message::PageDown if page.current_page < page.total_pages => {
                            Some(page.current_page + 1)
                        }
                        _ => None,
                    }
                });
                if let Some(page) = target {
                    self.filter(FilterMessage::PageSelected(page));
                }
                None
            }
            Message::Gallery(step) => {
                if let Some(DetailView::Loaded(page)) = &mut self.detail {
                    if let Some(gallery) = &mut page.gallery {
                        gallery.step(step);
                    }
                }
                None
            }
            Message::MovePanelCursor(delta) => {
                let len = match &self.detail {
                    Some(DetailView::Loaded(page)) => page.data_streams.len(),
                    _ => 0,
                };
                self.panel_cursor = move_cursor(self.panel_cursor, delta, len);
                None
            }
            Message::TogglePanel => match &self.detail {
                Some(DetailView::Loaded(page)) if self.panel_cursor < page.data_streams.len() => {
                    Some(Action::TogglePanel(self.panel_cursor))
                }
                _ => None,
            },
        }
    }

    /// Persist a preference change, then reload what the current view shows
    fn apply_preference<F>(&mut self, change: F) -> Option<Action>
    where
        F: FnOnce(&mut PreferenceStore<S>) -> anyhow::Result<Preferences>,
    {
        let preferences = match change(&mut self.preferences) {
            Ok(preferences) => preferences,
            Err(e) => {
                tracing::error!(error = %e, "Failed to save preferences");
                self.status = format!("Could not save preferences: {e}");
                return None;
            }
        };
        self.status = format!(
            "Kibana v{}{}",
            preferences.kibana_version,
            if preferences.include_prerelease {
                " (Pre-releases)"
            } else {
                ""
            }
        );

        // Stale collections are reloaded lazily when their view is shown
        self.home_loaded = false;
        self.browse = None;
        match self.view {
            View::Home => Some(Action::LoadHome),
            View::Browse => Some(Action::LoadBrowse),
            View::Detail => None,
        }
    }

    fn filter(&mut self, message: FilterMessage) {
        if let Some(browse) = &mut self.browse {
            browse.update(message);
            self.card_cursor = 0;
        }
    }

    fn open_selected(&mut self) -> Option<Action> {
        let name = match self.view {
            View::Home => {
                let index = self.home.carousel().state(self.selected_lane).index;
                self.home.lane(self.selected_lane).cards().get(index).map(|c| c.name.clone())
            }
            View::Browse => self
                .browse
                .as_ref()
                .and_then(|b| b.page().items.get(self.card_cursor).map(|p| p.name.clone())),
            View::Detail => None,
        }?;

        let preferences = self.preferences();
        self.return_to = self.view;
        self.view = View::Detail;
        self.detail = None;
        self.panel_cursor = 0;
        self.status = format!("Loading {name}...");
        Some(Action::OpenDetail(
            DetailRequest::new(name)
                .with_version(preferences.kibana_version)
                .with_prerelease(preferences.include_prerelease),
        ))
    }

    /// Home lanes finished loading
    pub fn home_loaded(&mut self) {
        self.home_loaded = true;
        self.status.clear();
        self.measure_lanes();
        self.positions = Lane::ALL_LANES
            .iter()
            .filter_map(|lane| self.home.carousel().position(*lane).map(|p| (*lane, p)))
            .collect();
    }

    pub fn browse_loaded(&mut self, result: CatalogResult<BrowsePage>) {
        self.status.clear();
        self.card_cursor = 0;
        self.category_cursor = 0;
        match result {
            Ok(page) => {
                self.browse = Some(page);
                self.browse_error = None;
            }
            Err(_) => {
                self.browse = None;
                self.browse_error = Some(epr_core::pages::browse::LOAD_FAILED);
            }
        }
    }

    pub fn detail_loaded(&mut self, view: DetailView) {
        self.status.clear();
        self.detail = Some(view);
    }

    /// Record lane layouts for the current terminal width
    fn measure_lanes(&mut self) {
        let viewport = f32::from(self.viewport_width.saturating_sub(2));
        for lane in Lane::ALL_LANES {
            let cards = self.home.lane(lane).cards().len();
            let layout = (cards > 0).then(|| LaneLayout {
                viewport_width: viewport,
                first_card_left: 0.0,
                second_card_left: (cards > 1).then_some(f32::from(CARD_WIDTH + CARD_GAP)),
                first_card_width: f32::from(CARD_WIDTH),
            });
            self.home.carousel_mut().set_layout(lane, layout);
        }
    }

    /// Cards of a lane that are currently in view
    pub fn visible_cards(&self, lane: Lane) -> &[CardModel] {
        let cards = self.home.lane(lane).cards();
        let start = self.home.carousel().state(lane).index.min(cards.len());
        let visible = self
            .positions
            .get(&lane)
            .map_or(cards.len(), |p| p.visible_count.max(1));
        let end = (start + visible).min(cards.len());
        &cards[start..end]
    }
}

/// Package types offered by the type filter: `all` then each type in
/// first-seen order
pub fn type_options(browse: &BrowsePage) -> Vec<String> {
    let mut options = vec![ALL.to_string()];
    for package_type in browse.packages().iter().filter_map(|p| p.package_type()) {
        if !options.iter().any(|o| o == package_type) {
            options.push(package_type.to_string());
        }
    }
    options
}

fn cycle_option(options: &[&str], current: &str) -> String {
    let position = options.iter().position(|o| *o == current);
    let next = position.map_or(0, |p| (p + 1) % options.len().max(1));
    options.get(next).copied().unwrap_or(ALL).to_string()
}

fn move_cursor(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    cursor.saturating_add_signed(delta).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use epr_core::package::PackageRecord;
    use epr_core::pages::browse::BrowsePreset;
    use epr_core::preferences::{MemoryStorage, VersionList};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn app() -> App<MemoryStorage> {
        let store = PreferenceStore::new(MemoryStorage::new(), VersionList::builtin());
        App::new(
            CatalogConfig::default(),
            Url::parse("https://epr.test/").unwrap(),
            store,
            122,
        )
    }

    fn packages(n: usize) -> Vec<PackageRecord> {
        (0..n)
            .map(|i| {
                PackageRecord::new(format!("pkg{i:02}"), "1.0.0")
                    .with_categories(if i % 2 == 0 { ["security"] } else { ["cloud"] })
                    .with_owner(if i % 3 == 0 { "partner" } else { "elastic" })
                    .with_type(if i % 4 == 0 { "content" } else { "integration" })
            })
            .collect()
    }

    fn loaded_home() -> App<MemoryStorage> {
        let mut app = app();
        let preferences = app.preferences();
        let ticket = app.home_mut().begin_reload(&preferences);
        let mut rng = StdRng::seed_from_u64(9);
        for lane in Lane::ALL_LANES {
            app.home_mut().apply(ticket, lane, Ok(packages(10)), &mut rng);
        }
        app.home_loaded();
        app
    }

    #[test]
    fn startup_loads_home() {
        let mut app = app();
        assert_eq!(app.startup(), Action::LoadHome);
    }

    #[test]
    fn lane_steps_respect_visible_count() {
        let mut app = loaded_home();
        // 120 usable columns, 30 per card
        assert_eq!(app.lane_position(Lane::All).unwrap().visible_count, 4);
        assert_eq!(app.visible_cards(Lane::All).len(), 4);

        for _ in 0..10 {
            app.update(Message::StepLane(Step::Next), Instant::now());
        }
        assert_eq!(app.home().carousel().state(Lane::All).index, 6);

        app.update(Message::NextLane, Instant::now());
        assert_eq!(app.selected_lane, Lane::Content);
        assert_eq!(app.home().carousel().state(Lane::Content).index, 0);
    }

    #[test]
    fn resize_applies_after_debounce() {
        let mut app = loaded_home();
        let start = Instant::now();
        app.update(Message::Resize(62), start);
        app.update(Message::Tick, start);
        assert_eq!(app.lane_position(Lane::All).unwrap().visible_count, 4);

        let later = start + app.config().resize_debounce();
        app.update(Message::Tick, later);
        assert_eq!(app.lane_position(Lane::All).unwrap().visible_count, 2);
    }

    #[test]
    fn narrow_terminal_keeps_one_card_in_view() {
        let mut app = loaded_home();
        let start = Instant::now();
        app.update(Message::Resize(20), start);
        app.update(Message::Tick, start + app.config().resize_debounce());
        assert_eq!(app.lane_position(Lane::All).unwrap().visible_count, 0);

        for _ in 0..20 {
            app.update(Message::StepLane(Step::Next), Instant::now());
        }
        assert_eq!(app.home().carousel().state(Lane::All).index, 9);
        assert_eq!(app.visible_cards(Lane::All).len(), 1);
    }

    #[test]
    fn version_change_persists_and_reloads() {
        let mut app = loaded_home();
        let action = app.update(Message::CycleVersion, Instant::now());
        assert_eq!(action, Some(Action::LoadHome));
        assert_eq!(app.preferences().kibana_version, "9.1.0");

        app.update(Message::ShowBrowse, Instant::now());
        let action = app.update(Message::TogglePrerelease, Instant::now());
        assert_eq!(action, Some(Action::LoadBrowse));
        assert!(app.preferences().include_prerelease);
    }

    #[test]
    fn open_card_from_home() {
        let mut app = loaded_home();
        let expected = app.home().lane(Lane::All).cards()[0].name.clone();
        let action = app.update(Message::OpenSelected, Instant::now());
        assert_eq!(
            action,
            Some(Action::OpenDetail(
                DetailRequest::new(expected).with_version("9.2.0")
            ))
        );
        assert_eq!(app.view, View::Detail);

        app.update(Message::Back, Instant::now());
        assert_eq!(app.view, View::Home);
    }

    #[test]
    fn browse_filters_through_messages() {
        let mut app = app();
        assert_eq!(app.update(Message::ShowBrowse, Instant::now()), Some(Action::LoadBrowse));
        app.browse_loaded(Ok(BrowsePage::new(packages(12), &BrowsePreset::default(), 5)));

        app.update(Message::PageDown, Instant::now());
        assert_eq!(app.browse().unwrap().page().current_page, 2);

        // Categories are sorted: cloud, security
        app.update(Message::MoveCategoryCursor(1), Instant::now());
        app.update(Message::ToggleCategory, Instant::now());
        let page = app.browse().unwrap().page();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_matched, 6);

        app.update(Message::CycleType, Instant::now());
        assert_eq!(app.browse().unwrap().filters().package_type, "content");

        app.update(Message::BeginTextEdit, Instant::now());
        assert!(app.editing_text);
        app.update(Message::TextInput('0'), Instant::now());
        app.update(Message::TextInput('8'), Instant::now());
        assert_eq!(app.browse().unwrap().filters().text, "08");
        assert_eq!(app.browse().unwrap().page().total_matched, 1);
        app.update(Message::TextBackspace, Instant::now());
        assert_eq!(app.browse().unwrap().filters().text, "0");
    }

    #[test]
    fn browse_failure_shows_message() {
        let mut app = app();
        app.update(Message::ShowBrowse, Instant::now());
        app.browse_loaded(Err(epr_core::error::CatalogError::Fetch { status: 500 }));
        assert_eq!(app.browse_error, Some("Could not load integrations."));
    }

    #[test]
    fn cursor_clamps() {
        assert_eq!(move_cursor(0, -1, 5), 0);
        assert_eq!(move_cursor(4, 1, 5), 4);
        assert_eq!(move_cursor(3, 1, 0), 0);
    }

    #[test]
    fn owner_cycle_wraps() {
        assert_eq!(cycle_option(&["all", "elastic"], "all"), "elastic");
        assert_eq!(cycle_option(&["all", "elastic"], "elastic"), "all");
        assert_eq!(cycle_option(&["all", "elastic"], "gone"), "all");
    }
}
