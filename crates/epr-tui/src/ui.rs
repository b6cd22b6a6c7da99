//! Rendering

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph, Wrap},
};

use epr_core::carousel::Lane;
use epr_core::pages::CardModel;
use epr_core::pages::detail::{DetailPage, DetailView};
use epr_core::pagination::PageControl;
use epr_core::preferences::SessionStorage;

use crate::app::{App, CARD_GAP, CARD_WIDTH, View, type_options};

const SIDEBAR_WIDTH: u16 = 26;

pub fn draw<S: SessionStorage>(frame: &mut Frame, app: &App<S>) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(frame, header, app);
    match app.view {
        View::Home => draw_home(frame, body, app),
        View::Browse => draw_browse(frame, body, app),
        View::Detail => draw_detail(frame, body, app),
    }
    draw_footer(frame, footer, app);
}

fn draw_header<S: SessionStorage>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let preferences = app.preferences();
    let tab = |label: &'static str, view: View| {
        if app.view == view {
            Span::styled(format!(" {label} "), Style::new().add_modifier(Modifier::REVERSED))
        } else {
            Span::raw(format!(" {label} "))
        }
    };
    let mut spans = vec![
        Span::styled("EPR ", Style::new().add_modifier(Modifier::BOLD)),
        tab("Home", View::Home),
        tab("Browse", View::Browse),
        tab("Detail", View::Detail),
        Span::raw(format!("  Kibana v{}", preferences.kibana_version)),
    ];
    if preferences.include_prerelease {
        spans.push(Span::styled(" [Pre-releases]", Style::new().fg(Color::Yellow)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_footer<S: SessionStorage>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let help = match app.view {
        View::Home => {
            "Tab lane  ←/→ scroll  Enter open  b browse  v version  p pre-releases  q quit"
        }
        View::Browse if app.editing_text => "Type to filter  Enter/Esc done",
        View::Browse => {
            "/ text  o owner  t type  ↑/↓ category  c toggle  ←/→ card  PgUp/PgDn page  \
             Enter open  h home  q quit"
        }
        View::Detail => "[/] screenshots  ↑/↓ data stream  s expand  Esc back  q quit",
    };
    let line = if app.status.is_empty() {
        Line::from(Span::styled(help, Style::new().fg(Color::DarkGray)))
    } else {
        Line::from(vec![
            Span::styled(app.status.as_str(), Style::new().fg(Color::Cyan)),
            Span::raw("  "),
            Span::styled(help, Style::new().fg(Color::DarkGray)),
        ])
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn lane_title(lane: Lane) -> &'static str {
    match lane {
        Lane::All => "All Integrations",
        Lane::Observability => "Observability",
        Lane::Security => "Security",
        Lane::Content => "Dashboard & Content",
    }
}

fn draw_home<S: SessionStorage>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let rows = Layout::vertical([Constraint::Ratio(1, 4); 4]).split(area);
    for (lane, row) in Lane::ALL_LANES.into_iter().zip(rows.iter()) {
        let position = app.lane_position(lane);
        let arrow = |enabled: bool, glyph: &'static str| {
            if enabled {
                Span::raw(glyph)
            } else {
                Span::styled(glyph, Style::new().fg(Color::DarkGray))
            }
        };
        let mut title = vec![Span::raw(format!(" {} ", lane_title(lane)))];
        if let Some(position) = position {
            title.push(arrow(position.prev_enabled, "◀"));
            title.push(Span::raw(" "));
            title.push(arrow(position.next_enabled, "▶"));
            title.push(Span::raw(" "));
        }

        let mut block = Block::bordered().title(Line::from(title));
        if lane == app.selected_lane {
            block = block.border_style(Style::new().fg(Color::Cyan));
        }
        let inner = block.inner(*row);
        frame.render_widget(block, *row);

        match app.home().lane(lane).message(lane) {
            Some(message) => frame.render_widget(Paragraph::new(message), inner),
            None => {
                for (i, card) in app.visible_cards(lane).iter().enumerate() {
                    let x = inner.x + i as u16 * (CARD_WIDTH + CARD_GAP);
                    if x + CARD_WIDTH > inner.right() {
                        break;
                    }
                    let slot = Rect::new(x, inner.y, CARD_WIDTH, inner.height);
                    frame.render_widget(card_text(card), slot);
                }
            }
        }
    }
}

fn card_text(card: &CardModel) -> Paragraph<'_> {
    Paragraph::new(Text::from(vec![
        Line::from(Span::styled(card.title.as_str(), Style::new().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(card.version_label.as_str(), Style::new().fg(Color::Green))),
        Line::from(card.description.as_str()),
    ]))
    .wrap(Wrap { trim: true })
}

fn draw_browse<S: SessionStorage>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let Some(browse) = app.browse() else {
        let message = app.browse_error.unwrap_or("Loading integrations...");
        frame.render_widget(Paragraph::new(message).block(Block::bordered()), area);
        return;
    };
    let preferences = app.preferences();
    let view = browse.view(&preferences, &app.card_context());
    let filters = browse.filters();

    let [sidebar, main] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)]).areas(area);

    // Filters
    let owner_label = browse
        .owner_options()
        .iter()
        .find(|o| o.value == filters.owner)
        .map_or(filters.owner.as_str(), |o| o.label.as_str());
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Text:  "),
            Span::styled(
                if app.editing_text {
                    format!("{}_", filters.text)
                } else {
                    filters.text.clone()
                },
                Style::new().fg(Color::Yellow),
            ),
        ]),
        Line::from(format!("Owner: {owner_label}")),
        Line::from(format!(
            "Type:  {} ({} options)",
            filters.package_type,
            type_options(browse).len()
        )),
        Line::from(""),
        Line::from(Span::styled("Categories", Style::new().add_modifier(Modifier::BOLD))),
    ];
    for (i, category) in browse.category_options().iter().enumerate() {
        let mark = if filters.categories.contains(category) { "[x]" } else { "[ ]" };
        let style = if i == app.category_cursor {
            Style::new().add_modifier(Modifier::REVERSED)
        } else {
            Style::new()
        };
        lines.push(Line::from(Span::styled(format!("{mark} {category}"), style)));
    }
    let skip = app.category_cursor.saturating_sub(sidebar.height.saturating_sub(8) as usize);
    frame.render_widget(
        Paragraph::new(lines)
            .scroll((skip as u16, 0))
            .block(Block::bordered().title(" Filters ")),
        sidebar,
    );

    // Results
    let [grid, pager] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(main);
    let block = Block::bordered().title(format!(" {} ", view.title));
    let inner = block.inner(grid);
    frame.render_widget(block, grid);

    if let Some(message) = view.message {
        frame.render_widget(Paragraph::new(message), inner);
    } else {
        let lines: Vec<Line> = view
            .cards
            .iter()
            .enumerate()
            .map(|(i, card)| {
                let style = if i == app.card_cursor {
                    Style::new().add_modifier(Modifier::REVERSED)
                } else {
                    Style::new()
                };
                Line::from(vec![
                    Span::styled(format!("{:<32}", card.title), style.add_modifier(Modifier::BOLD)),
                    Span::styled(format!("{:<10}", card.version_label), style.fg(Color::Green)),
                    Span::styled(card.description.clone(), style),
                ])
            })
            .collect();
        let skip = app.card_cursor.saturating_sub(inner.height.saturating_sub(1) as usize);
        frame.render_widget(Paragraph::new(lines).scroll((skip as u16, 0)), inner);
    }

    frame.render_widget(Paragraph::new(pager_line(&view.controls, view.total_matched)), pager);
}

fn pager_line(controls: &[PageControl], total: usize) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = controls
        .iter()
        .flat_map(|control| {
            let style = match control {
                PageControl::Page { active: true, .. } => {
                    Style::new().add_modifier(Modifier::REVERSED)
                }
                PageControl::Prev { disabled: true, .. }
                | PageControl::Next { disabled: true, .. } => Style::new().fg(Color::DarkGray),
                _ => Style::new(),
            };
            [Span::styled(control.label(), style), Span::raw(" ")]
        })
        .collect();
    spans.push(Span::styled(
        format!(" {total} matching"),
        Style::new().fg(Color::DarkGray),
    ));
    Line::from(spans)
}

fn draw_detail<S: SessionStorage>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let page = match app.detail() {
        None => {
            frame.render_widget(Paragraph::new("Loading...").block(Block::bordered()), area);
            return;
        }
        Some(DetailView::Loaded(page)) => page,
        Some(view) => {
            let message = view.message().unwrap_or_default();
            frame.render_widget(
                Paragraph::new(message)
                    .style(Style::new().fg(Color::Red))
                    .block(Block::bordered()),
                area,
            );
            return;
        }
    };

    let [summary, streams, readme] = Layout::vertical([
        Constraint::Length(7),
        Constraint::Percentage(45),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(summary_text(page), summary);
    frame.render_widget(streams_text(page, app.panel_cursor), streams);

    let readme_text = page.readme.as_deref().unwrap_or_default();
    frame.render_widget(
        Paragraph::new(readme_text)
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(" README ")),
        readme,
    );
}

fn summary_text(page: &DetailPage) -> Paragraph<'_> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(page.title(), Style::new().add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::styled(page.version_label(), Style::new().fg(Color::Green)),
        ]),
        Line::from(page.package.description.as_str()),
        Line::from(format!("Download: {}", page.download_url)),
    ];
    if page.from_summary {
        lines.push(Line::from(Span::styled(
            "Detailed info unavailable, showing summary data",
            Style::new().fg(Color::Yellow),
        )));
    }
    if let Some(gallery) = &page.gallery {
        if let Some(image) = gallery.current() {
            let prev = if gallery.carousel.prev_enabled() { "◀" } else { " " };
            let next = if gallery.carousel.next_enabled() { "▶" } else { " " };
            lines.push(Line::from(format!(
                "{prev} {} {next}  {} {}",
                gallery.carousel.counter(),
                image.title,
                image.url
            )));
        }
    }
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::bordered())
}

fn streams_text(page: &DetailPage, cursor: usize) -> Paragraph<'_> {
    let mut lines = Vec::new();
    for (i, panel) in page.data_streams.iter().enumerate() {
        let marker = if panel.is_expanded() { "▼" } else { "▶" };
        let style = if i == cursor {
            Style::new().add_modifier(Modifier::REVERSED)
        } else {
            Style::new()
        };
        lines.push(Line::from(Span::styled(
            format!("{marker} {}", panel.heading),
            style.add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {}", panel.subtitle),
            Style::new().fg(Color::DarkGray),
        )));
        if let Some(sample) = panel.sample() {
            lines.extend(sample.text().lines().map(|l| Line::from(format!("    {l}"))));
        }
    }
    Paragraph::new(lines).block(Block::bordered().title(format!(
        " Data streams ({}) ",
        page.data_streams.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use epr_core::pagination::page_controls;

    #[test]
    fn pager_line_labels_every_control() {
        let line = pager_line(&page_controls(25, 2, 10), 25);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "< Prev 1 2 3 Next >  25 matching");
    }
}
