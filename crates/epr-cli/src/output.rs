//! Table and JSON rendering for the CLI.

use std::path::Path;

use anyhow::Result;

use epr_core::carousel::Lane;
use epr_core::config::CatalogConfig;
use epr_core::pages::browse::{BrowsePage, BrowseView};
use epr_core::pages::detail::DetailPage;
use epr_core::pages::home::HomePage;
use epr_core::pages::search::SearchView;
use epr_core::pages::CardModel;
use epr_core::pagination::PageControl;
use epr_core::preferences::{Preferences, VersionSelector};

use crate::OutputFormat;

pub fn print_home(
    page: &HomePage,
    preferences: &Preferences,
    only: Option<Lane>,
    format: OutputFormat,
) -> Result<()> {
    let lanes: Vec<Lane> = Lane::ALL_LANES
        .into_iter()
        .filter(|lane| only.is_none_or(|only| only == *lane))
        .collect();
    match format {
        OutputFormat::Table => {
            println!("{}", version_banner(preferences));
            for &lane in &lanes {
                let view = page.lane(lane);
                println!();
                println!("{}:", lane_heading(lane));
                match view.message(lane) {
                    Some(message) => println!("  {}", message),
                    None => print_cards(view.cards()),
                }
            }
        }
        OutputFormat::Json => {
            let lanes: serde_json::Map<String, serde_json::Value> = lanes
                .iter()
                .map(|lane| {
                    let view = page.lane(*lane);
                    (
                        lane.to_string(),
                        serde_json::json!({
                            "message": view.message(*lane),
                            "cards": view.cards(),
                        }),
                    )
                })
                .collect();
            let output = serde_json::json!({
                "kibana_version": preferences.kibana_version,
                "prerelease": preferences.include_prerelease,
                "lanes": lanes,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub fn print_search(view: &SearchView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", view.title());
            match view.message() {
                Some(message) => println!("  {}", message),
                None => print_cards(view.cards()),
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "title": view.title(),
                "message": view.message(),
                "cards": view.cards(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub fn print_detail(
    page: &DetailPage,
    show_readme: bool,
    missing_samples: &[&str],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => print_detail_table(page, show_readme, missing_samples),
        OutputFormat::Json => {
            let screenshots: Vec<_> = page
                .gallery
                .iter()
                .flat_map(|g| &g.images)
                .map(|image| serde_json::json!({"url": image.url, "title": image.title}))
                .collect();
            let data_streams: Vec<_> = page
                .data_streams
                .iter()
                .map(|panel| {
                    serde_json::json!({
                        "heading": panel.heading,
                        "subtitle": panel.subtitle,
                        "dataset": panel.dataset,
                        "sample_event": panel.sample().map(|s| s.text()),
                    })
                })
                .collect();
            let output = serde_json::json!({
                "name": page.package.name,
                "title": page.title(),
                "version": page.package.version,
                "description": page.package.description,
                "from_summary": page.from_summary,
                "icon_url": page.icon_url,
                "download_url": page.download_url,
                "readme": if show_readme { page.readme.as_deref() } else { None },
                "screenshots": screenshots,
                "data_streams": data_streams,
                "unknown_datasets": missing_samples,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn print_detail_table(page: &DetailPage, show_readme: bool, missing_samples: &[&str]) {
    println!("{} {}", page.title(), page.version_label());
    if page.from_summary {
        println!("  (summary data only, detailed info unavailable)");
    }
    if !page.package.description.is_empty() {
        println!("  {}", page.package.description);
    }
    println!();
    if !page.icon_url.is_empty() {
        println!("Icon:     {}", page.icon_url);
    }
    println!("Download: {}", page.download_url);

    if let Some(gallery) = &page.gallery {
        println!();
        println!("Screenshots ({}):", gallery.images.len());
        for image in &gallery.images {
            if image.title.is_empty() {
                println!("  {}", image.url);
            } else {
                println!("  {} - {}", image.title, image.url);
            }
        }
    }

    if !page.data_streams.is_empty() {
        println!();
        println!("Data streams ({}):", page.data_streams.len());
        for panel in &page.data_streams {
            println!("  {}", panel.heading);
            println!("    {}", panel.subtitle);
            if let Some(sample) = panel.sample() {
                for line in sample.text().lines() {
                    println!("    {}", line);
                }
            }
        }
    }
    for dataset in missing_samples {
        println!("  Warning: no data stream named '{}'", dataset);
    }

    if show_readme {
        if let Some(readme) = &page.readme {
            println!();
            println!("{}", readme);
        }
    }
}

pub fn print_browse(page: &BrowsePage, view: &BrowseView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", view.title);
            let owners: Vec<_> = page.owner_options().iter().map(|o| o.label.as_str()).collect();
            println!("Owners:     {}", owners.join(", "));
            println!("Categories: {}", page.category_options().join(", "));
            println!();
            match view.message {
                Some(message) => println!("  {}", message),
                None => print_cards(&view.cards),
            }
            if !view.controls.is_empty() {
                println!();
                println!("  {}", render_controls(&view.controls));
            }
        }
        OutputFormat::Json => {
            let filtered = page.page();
            let output = serde_json::json!({
                "title": view.title,
                "total_matched": view.total_matched,
                "current_page": filtered.current_page,
                "total_pages": filtered.total_pages,
                "message": view.message,
                "owners": page.owner_options(),
                "categories": page.category_options(),
                "cards": view.cards,
                "pagination": view.controls.iter().map(PageControl::label).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub fn print_preferences(
    preferences: &Preferences,
    path: &Path,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("Kibana version: {}", preferences.kibana_version);
            println!(
                "Pre-releases:   {}",
                if preferences.include_prerelease { "on" } else { "off" }
            );
            println!("Session file:   {}", path.display());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(preferences)?);
        }
    }
    Ok(())
}

pub fn print_versions(selector: &VersionSelector, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            for version in &selector.options {
                let marker = if *version == selector.selected { "*" } else { " " };
                println!("{} {}", marker, version);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "selected": selector.selected,
                "versions": selector.options,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub fn print_config(config: &CatalogConfig, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("# {}", path.display());
            print!("{}", toml::to_string_pretty(config)?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}

fn version_banner(preferences: &Preferences) -> String {
    let mut banner = format!("Kibana v{}", preferences.kibana_version);
    if preferences.include_prerelease {
        banner.push_str(" (Pre-releases)");
    }
    banner
}

fn lane_heading(lane: Lane) -> &'static str {
    match lane {
        Lane::All => "All Integrations",
        Lane::Observability => "Observability",
        Lane::Security => "Security",
        Lane::Content => "Dashboard & Content",
    }
}

fn print_cards(cards: &[CardModel]) {
    println!("  {:<30} {:<10} Description", "Title", "Version");
    println!("  {}", "-".repeat(70));
    for card in cards {
        println!(
            "  {:<30} {:<10} {}",
            truncate(&card.title, 30),
            truncate(&card.version_label, 10),
            card.description
        );
    }
}

fn render_controls(controls: &[PageControl]) -> String {
    controls
        .iter()
        .map(|control| match control {
            PageControl::Page { number, active: true } => format!("[{}]", number),
            PageControl::Prev { disabled: true, .. } | PageControl::Next { disabled: true, .. } => {
                format!("({})", control.label())
            }
            _ => control.label(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
