//! Page-control model for paginated views.

use crate::filter::total_pages;

/// Page counts up to this render every page button
pub const FULL_PAGE_LIST_MAX: usize = 7;

/// Pages shown on each side of the current page
pub const WINDOW: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    Prev { target: usize, disabled: bool },
    Page { number: usize, active: bool },
    Ellipsis,
    Next { target: usize, disabled: bool },
}

impl PageControl {
    /// Page the control navigates to, if it is clickable
    pub fn target(&self) -> Option<usize> {
        match *self {
            PageControl::Prev { target, disabled } | PageControl::Next { target, disabled } => {
                (!disabled).then_some(target)
            }
            PageControl::Page { number, .. } => Some(number),
            PageControl::Ellipsis => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            PageControl::Prev { .. } => "< Prev".to_string(),
            PageControl::Page { number, .. } => number.to_string(),
            PageControl::Ellipsis => "...".to_string(),
            PageControl::Next { .. } => "Next >".to_string(),
        }
    }
}

/// Controls for `total_items` split into pages of `per_page`.
///
/// Empty when everything fits on one page. Otherwise prev/next wrap the
/// page buttons; long page lists show first, last and a window of
/// [`WINDOW`] around `current`, with one ellipsis per gap. A gap hiding a
/// single page shows that page instead.
pub fn page_controls(total_items: usize, current: usize, per_page: usize) -> Vec<PageControl> {
    let total = total_pages(total_items, per_page);
    if total <= 1 {
        return Vec::new();
    }
    let current = current.clamp(1, total);

    let mut controls = vec![PageControl::Prev {
        target: current - 1,
        disabled: current == 1,
    }];

    if total <= FULL_PAGE_LIST_MAX {
        controls.extend((1..=total).map(|number| PageControl::Page {
            number,
            active: number == current,
        }));
    } else {
        let low = current.saturating_sub(WINDOW).max(1);
        let high = (current + WINDOW).min(total);

        let mut shown: Vec<usize> = vec![1];
        shown.extend(low..=high);
        shown.push(total);
        shown.sort_unstable();
        shown.dedup();

        let mut previous = 0;
        for number in shown {
            match number - previous {
                1 => {}
                // Exactly one hidden page: show it rather than an ellipsis
                2 => controls.push(PageControl::Page {
                    number: number - 1,
                    active: false,
                }),
                _ => controls.push(PageControl::Ellipsis),
            }
            controls.push(PageControl::Page {
                number,
                active: number == current,
            });
            previous = number;
        }
    }

    controls.push(PageControl::Next {
        target: current + 1,
        disabled: current == total,
    });
    controls
}
