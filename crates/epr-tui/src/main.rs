//! EPR TUI - Terminal User Interface
//!
//! Ratatui-based catalog browser: home lanes, a filterable browse grid and
//! package details.

mod app;
mod event;
mod ui;

use std::time::{Duration, Instant};

use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    crossterm::{
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epr_core::api::RegistryClient;
use epr_core::config::ConfigStore;
use epr_core::pages::browse::{self, BrowsePreset};
use epr_core::pages::detail::{self, DetailView};
use epr_core::pages::home;
use epr_core::preferences::{FileStorage, PreferenceStore};

use crate::app::{Action, App};

const TICK: Duration = Duration::from_millis(50);

type Backend = CrosstermBackend<std::io::Stdout>;

fn main() -> anyhow::Result<()> {
    // Logs would corrupt the alternate screen; only emit them on request
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "epr_tui=debug,info".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config = ConfigStore::with_defaults()?.load()?;
    let registry_url = config.registry_base()?;
    let client = RegistryClient::new(registry_url.clone())?;
    let preferences = PreferenceStore::new(FileStorage::with_defaults()?, config.version_list());
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let width = terminal.size()?.width;
    let mut app = App::new(config, registry_url, preferences, width);

    // Run the TUI
    let res = run_tui(&mut terminal, &mut app, &client, &runtime);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

fn run_tui(
    terminal: &mut Terminal<Backend>,
    app: &mut App<FileStorage>,
    client: &RegistryClient,
    runtime: &tokio::runtime::Runtime,
) -> anyhow::Result<()> {
    let startup = app.startup();
    terminal.draw(|f| ui::draw(f, app))?;
    perform(app, client, runtime, startup);

    while !app.should_quit {
        terminal.draw(|f| ui::draw(f, app))?;

        let Some(message) = event::poll(TICK, app.view, app.editing_text)? else {
            continue;
        };
        if let Some(action) = app.update(message, Instant::now()) {
            // Show the loading state before blocking on the registry
            terminal.draw(|f| ui::draw(f, app))?;
            perform(app, client, runtime, action);
        }
    }
    Ok(())
}

/// Run one registry-backed action and feed the result back into the app
fn perform(
    app: &mut App<FileStorage>,
    client: &RegistryClient,
    runtime: &tokio::runtime::Runtime,
    action: Action,
) {
    tracing::debug!(?action, "Performing action");
    let preferences = app.preferences();
    match action {
        Action::LoadHome => {
            runtime.block_on(home::load_home(
                app.home_mut(),
                client,
                &preferences,
                &mut rand::thread_rng(),
            ));
            app.home_loaded();
        }
        Action::LoadBrowse => {
            let items_per_page = app.config().items_per_page;
            let result = runtime.block_on(browse::load_browse(
                client,
                &preferences,
                &BrowsePreset::default(),
                items_per_page,
            ));
            app.browse_loaded(result);
        }
        Action::OpenDetail(request) => {
            let view = runtime.block_on(detail::open_detail(client, Some(&request)));
            app.detail_loaded(view);
        }
        Action::TogglePanel(index) => {
            if let Some(DetailView::Loaded(page)) = app.detail_mut() {
                runtime.block_on(page.toggle_panel(client, index));
            }
        }
    }
}
