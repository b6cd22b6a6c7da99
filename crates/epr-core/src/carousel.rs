//! Carousel lanes.
//!
//! Each named lane keeps a [`CarouselState`]. The controller maps that
//! state plus live layout measurements to a horizontal offset and the
//! enabled/disabled flags of the lane's prev/next controls. Disabled
//! controls are authoritative: steps against them are ignored, so the
//! index never leaves `0..=max - visible`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(200);

/// Named home-page lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lane {
    All,
    Content,
    Observability,
    Security,
}

impl Lane {
    pub const ALL_LANES: [Lane; 4] = [
        Lane::All,
        Lane::Content,
        Lane::Observability,
        Lane::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::All => "all",
            Lane::Content => "content",
            Lane::Observability => "observability",
            Lane::Security => "security",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lane {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Lane::All),
            "content" => Ok(Lane::Content),
            "observability" => Ok(Lane::Observability),
            "security" => Ok(Lane::Security),
            _ => anyhow::bail!("Unknown lane: {}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Prev,
    Next,
}

/// Scroll position of one lane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarouselState {
    pub index: usize,
    pub max: usize,
}

impl CarouselState {
    pub fn prev_enabled(&self) -> bool {
        self.index > 0
    }

    /// A viewport narrower than one card still shows one card
    pub fn next_enabled(&self, visible: usize) -> bool {
        self.index + visible.max(1) < self.max
    }
}

/// Measurements of a rendered lane, in whatever unit the view uses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneLayout {
    /// Width of the lane's viewport
    pub viewport_width: f32,
    /// Left edge of the first rendered card
    pub first_card_left: f32,
    /// Left edge of the second rendered card, when there is one
    pub second_card_left: Option<f32>,
    /// Width of the first rendered card
    pub first_card_width: f32,
}

impl LaneLayout {
    /// Distance covered by one step: card width plus gap. Measured from
    /// the first two cards so responsive sizing stays correct.
    pub fn stride(&self) -> f32 {
        match self.second_card_left {
            Some(second) => second - self.first_card_left,
            None => self.first_card_width,
        }
    }

    /// Cards that fit entirely in the viewport
    pub fn visible_count(&self) -> usize {
        let stride = self.stride();
        if stride <= 0.0 || !stride.is_finite() {
            return 0;
        }
        (self.viewport_width / stride).floor().max(0.0) as usize
    }
}

/// What the view needs to draw a lane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanePosition {
    pub translate_x: f32,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub visible_count: usize,
}

impl LanePosition {
    fn compute(state: &CarouselState, layout: &LaneLayout) -> Self {
        let visible_count = layout.visible_count();
        Self {
            translate_x: -(state.index as f32) * layout.stride(),
            prev_enabled: state.prev_enabled(),
            next_enabled: state.next_enabled(visible_count),
            visible_count,
        }
    }

    pub fn transform(&self) -> String {
        format!("translateX({}px)", self.translate_x)
    }
}

/// Trailing-edge debounce for viewport resizes
#[derive(Debug, Clone)]
pub struct ResizeDebounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl ResizeDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Each resize pushes the deadline out
    pub fn record(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once, when the quiet period has elapsed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Owns every lane's state and last-known layout
#[derive(Debug, Clone)]
pub struct CarouselController {
    lanes: BTreeMap<Lane, CarouselState>,
    layouts: BTreeMap<Lane, LaneLayout>,
    resize: ResizeDebounce,
}

impl Default for CarouselController {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_DEBOUNCE)
    }
}

impl CarouselController {
    pub fn new(resize_debounce: Duration) -> Self {
        Self {
            lanes: Lane::ALL_LANES
                .iter()
                .map(|lane| (*lane, CarouselState::default()))
                .collect(),
            layouts: BTreeMap::new(),
            resize: ResizeDebounce::new(resize_debounce),
        }
    }

    pub fn state(&self, lane: Lane) -> CarouselState {
        self.lanes.get(&lane).copied().unwrap_or_default()
    }

    /// Lane data reloaded: back to the start with the new item count
    pub fn reset(&mut self, lane: Lane, loaded: usize) {
        self.lanes.insert(
            lane,
            CarouselState {
                index: 0,
                max: loaded,
            },
        );
    }

    /// Rewind every lane ahead of a full reload
    pub fn rewind_all(&mut self) {
        for state in self.lanes.values_mut() {
            state.index = 0;
        }
    }

    /// Record fresh layout measurements. A lane with no rendered cards has
    /// no layout.
    pub fn set_layout(&mut self, lane: Lane, layout: Option<LaneLayout>) {
        match layout {
            Some(layout) => {
                self.layouts.insert(lane, layout);
            }
            None => {
                self.layouts.remove(&lane);
            }
        }
    }

    /// Offset and control flags, `None` until the lane has been laid out
    pub fn position(&self, lane: Lane) -> Option<LanePosition> {
        let layout = self.layouts.get(&lane)?;
        Some(LanePosition::compute(&self.state(lane), layout))
    }

    /// Step a lane. Steps on a disabled control are ignored and return
    /// `None`.
    pub fn step(&mut self, lane: Lane, step: Step) -> Option<LanePosition> {
        let position = self.position(lane)?;
        let state = self.lanes.entry(lane).or_default();
        match step {
            Step::Prev if position.prev_enabled => state.index -= 1,
            Step::Next if position.next_enabled => state.index += 1,
            _ => {
                tracing::debug!(%lane, ?step, "Ignoring step on disabled control");
                return None;
            }
        }
        self.position(lane)
    }

    pub fn on_resize(&mut self, now: Instant) {
        self.resize.record(now);
    }

    /// After the debounce delay, recompute every laid-out lane
    pub fn poll_resize(&mut self, now: Instant) -> Vec<(Lane, LanePosition)> {
        if !self.resize.fire(now) {
            return Vec::new();
        }
        Lane::ALL_LANES
            .iter()
            .filter_map(|lane| self.position(*lane).map(|p| (*lane, p)))
            .collect()
    }
}

/// Screenshot gallery: one image per viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalleryCarousel {
    index: usize,
    len: usize,
}

impl GalleryCarousel {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn prev_enabled(&self) -> bool {
        self.index > 0
    }

    pub fn next_enabled(&self) -> bool {
        self.index + 1 < self.len
    }

    pub fn step(&mut self, step: Step) -> bool {
        match step {
            Step::Prev if self.prev_enabled() => self.index -= 1,
            Step::Next if self.next_enabled() => self.index += 1,
            _ => return false,
        }
        true
    }

    pub fn transform(&self) -> String {
        format!("translateX(-{}%)", self.index * 100)
    }

    pub fn counter(&self) -> String {
        format!("{} / {}", self.index + 1, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(viewport: f32, card: f32, gap: f32) -> LaneLayout {
        LaneLayout {
            viewport_width: viewport,
            first_card_left: 0.0,
            second_card_left: Some(card + gap),
            first_card_width: card,
        }
    }

    #[test]
    fn test_lane_round_trips_through_str() {
        for lane in Lane::ALL_LANES {
            assert_eq!(lane.as_str().parse::<Lane>().unwrap(), lane);
        }
        assert!("featured".parse::<Lane>().is_err());
    }

    #[test]
    fn test_stride_and_visible_count() {
        let two = layout(1000.0, 280.0, 20.0);
        assert_eq!(two.stride(), 300.0);
        assert_eq!(two.visible_count(), 3);

        let single = LaneLayout {
            viewport_width: 1000.0,
            first_card_left: 16.0,
            second_card_left: None,
            first_card_width: 280.0,
        };
        assert_eq!(single.stride(), 280.0);
        assert_eq!(single.visible_count(), 3);

        let degenerate = LaneLayout {
            first_card_width: 0.0,
            ..single
        };
        assert_eq!(degenerate.visible_count(), 0);
    }

    #[test]
    fn test_no_position_before_layout() {
        let mut controller = CarouselController::default();
        controller.reset(Lane::Security, 10);
        assert!(controller.position(Lane::Security).is_none());
        assert!(controller.step(Lane::Security, Step::Next).is_none());
        assert_eq!(controller.state(Lane::Security).index, 0);
    }

    #[test]
    fn test_steps_respect_disabled_controls() {
        let mut controller = CarouselController::default();
        controller.reset(Lane::All, 10);
        controller.set_layout(Lane::All, Some(layout(1000.0, 280.0, 20.0)));

        let start = controller.position(Lane::All).unwrap();
        assert!(!start.prev_enabled);
        assert!(start.next_enabled);
        assert!(controller.step(Lane::All, Step::Prev).is_none());

        // 10 cards, 3 visible: index may reach 7
        for _ in 0..7 {
            assert!(controller.step(Lane::All, Step::Next).is_some());
        }
        let end = controller.position(Lane::All).unwrap();
        assert_eq!(controller.state(Lane::All).index, 7);
        assert!(!end.next_enabled);
        assert_eq!(end.translate_x, -2100.0);
        assert_eq!(end.transform(), "translateX(-2100px)");
        assert!(controller.step(Lane::All, Step::Next).is_none());
    }

    #[test]
    fn test_viewport_narrower_than_card_steps_one_card_at_a_time() {
        let mut controller = CarouselController::default();
        controller.reset(Lane::Security, 3);
        controller.set_layout(Lane::Security, Some(layout(100.0, 280.0, 20.0)));
        assert_eq!(controller.position(Lane::Security).unwrap().visible_count, 0);

        assert!(controller.step(Lane::Security, Step::Next).is_some());
        assert!(controller.step(Lane::Security, Step::Next).is_some());
        let end = controller.position(Lane::Security).unwrap();
        assert_eq!(controller.state(Lane::Security).index, 2);
        assert!(!end.next_enabled);
        assert!(controller.step(Lane::Security, Step::Next).is_none());

        let single = CarouselState { index: 0, max: 1 };
        assert!(!single.next_enabled(0));
    }

    #[test]
    fn test_fewer_cards_than_viewport_disables_next() {
        let mut controller = CarouselController::default();
        controller.reset(Lane::Content, 2);
        controller.set_layout(Lane::Content, Some(layout(1000.0, 280.0, 20.0)));
        let position = controller.position(Lane::Content).unwrap();
        assert!(!position.prev_enabled);
        assert!(!position.next_enabled);
    }

    #[test]
    fn test_reset_rewinds_index() {
        let mut controller = CarouselController::default();
        controller.reset(Lane::Observability, 10);
        controller.set_layout(Lane::Observability, Some(layout(600.0, 280.0, 20.0)));
        controller.step(Lane::Observability, Step::Next);
        controller.step(Lane::Observability, Step::Next);
        assert_eq!(controller.state(Lane::Observability).index, 2);

        controller.reset(Lane::Observability, 4);
        assert_eq!(
            controller.state(Lane::Observability),
            CarouselState { index: 0, max: 4 }
        );
    }

    #[test]
    fn test_resize_is_debounced() {
        let mut controller = CarouselController::new(Duration::from_millis(200));
        controller.reset(Lane::All, 10);
        controller.set_layout(Lane::All, Some(layout(1000.0, 280.0, 20.0)));

        let t0 = Instant::now();
        controller.on_resize(t0);
        controller.on_resize(t0 + Duration::from_millis(150));
        assert!(controller.poll_resize(t0 + Duration::from_millis(300)).is_empty());

        // Narrower viewport after the resize settles
        controller.set_layout(Lane::All, Some(layout(600.0, 280.0, 20.0)));
        let updated = controller.poll_resize(t0 + Duration::from_millis(350));
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].0, Lane::All);
        assert_eq!(updated[0].1.visible_count, 2);

        assert!(controller.poll_resize(t0 + Duration::from_millis(900)).is_empty());
    }

    #[test]
    fn test_gallery_carousel() {
        let mut gallery = GalleryCarousel::new(3);
        assert_eq!(gallery.counter(), "1 / 3");
        assert!(!gallery.prev_enabled());
        assert!(!gallery.step(Step::Prev));

        assert!(gallery.step(Step::Next));
        assert!(gallery.step(Step::Next));
        assert!(!gallery.step(Step::Next));
        assert_eq!(gallery.transform(), "translateX(-200%)");
        assert_eq!(gallery.counter(), "3 / 3");
    }
}
