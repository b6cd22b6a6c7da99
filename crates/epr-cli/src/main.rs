//! epr - Elastic package registry catalog browser
//!
//! Usage:
//!   epr                 # Home lanes (default)
//!   epr search aws      # Search page
//!   epr show nginx      # Detail page
//!   epr browse ...      # Filterable, paginated browse page
//!   epr prefs ...       # Session preferences

mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epr_core::api::RegistryClient;
use epr_core::carousel::Lane;
use epr_core::config::{CatalogConfig, ConfigStore};
use epr_core::filter::FilterMessage;
use epr_core::pages::browse::{self, BrowsePreset};
use epr_core::pages::detail::{self, DetailRequest, DetailView};
use epr_core::pages::home::{self, HomePage};
use epr_core::pages::search;
use epr_core::pages::CardContext;
use epr_core::preferences::{FileStorage, PreferenceStore};

#[derive(Parser)]
#[command(name = "epr")]
#[command(about = "Browse the Elastic package registry", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalArgs {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session file holding the selected version and prerelease flag
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, global = true, default_value = "table")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the four home page lanes
    Home {
        /// Only print this lane (all, observability, security, content)
        #[arg(long)]
        lane: Option<Lane>,
    },

    /// Search integrations by title or name
    Search {
        /// Search term
        query: String,
    },

    /// Show one integration
    Show(ShowArgs),

    /// Browse all integrations with filters
    Browse(BrowseArgs),

    /// Manage session preferences
    Prefs(PrefsArgs),

    /// List supported Kibana versions
    Versions,

    /// Manage the configuration file
    Config(ConfigArgs),
}

#[derive(Args)]
struct ShowArgs {
    /// Package name
    package: String,

    /// Kibana version constraint (not taken from the session)
    #[arg(long)]
    kibana_version: Option<String>,

    /// Include prerelease versions
    #[arg(long)]
    prerelease: bool,

    /// Print the README
    #[arg(long)]
    readme: bool,

    /// Expand a data stream and print its sample event
    #[arg(long = "sample", value_name = "DATASET")]
    samples: Vec<String>,
}

#[derive(Args)]
struct BrowseArgs {
    /// Text filter on title or name
    #[arg(long)]
    q: Option<String>,

    /// Category filter (repeatable, any-of)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Package type (integration, content, ...)
    #[arg(long = "type")]
    package_type: Option<String>,

    /// Owner type (elastic, partner, community, ...)
    #[arg(long)]
    owner: Option<String>,

    /// Page number (1-indexed)
    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Args)]
struct PrefsArgs {
    #[command(subcommand)]
    command: PrefsSubcommand,
}

#[derive(Subcommand)]
enum PrefsSubcommand {
    /// Show the stored preferences
    Show,

    /// Select a Kibana version
    SetVersion {
        /// One of the versions listed by `epr versions`
        version: String,
    },

    /// Include or exclude prerelease packages
    Prerelease {
        state: Toggle,
    },

    /// Forget the stored preferences
    Reset,
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq, Debug)]
pub(crate) enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq, Debug)]
enum Toggle {
    On,
    Off,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "epr=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    run(cli.global, cli.command.unwrap_or(Commands::Home { lane: None }))
}

/// Everything a command needs: configuration, preferences and a client
struct Session {
    config_store: ConfigStore,
    config: CatalogConfig,
    preferences: PreferenceStore<FileStorage>,
}

impl Session {
    fn open(global: &GlobalArgs) -> Result<Self> {
        let config_store = match &global.config {
            Some(path) => ConfigStore::from_path(path),
            None => ConfigStore::with_defaults()?,
        };
        let config = config_store.load()?;
        tracing::debug!(path = %config_store.config_path().display(), "Loaded configuration");
        let storage = match &global.session {
            Some(path) => FileStorage::open(path)?,
            None => FileStorage::with_defaults()?,
        };
        let preferences = PreferenceStore::new(storage, config.version_list());
        Ok(Self {
            config_store,
            config,
            preferences,
        })
    }

    fn client(&self) -> Result<RegistryClient> {
        Ok(RegistryClient::new(self.config.registry_base()?)?)
    }

    fn card_context(&self, client: &RegistryClient) -> CardContext {
        CardContext::new(
            client.base_url().clone(),
            &self.config.site_base_url,
            &self.preferences.load(),
        )
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))
}

fn run(global: GlobalArgs, command: Commands) -> Result<()> {
    let format = global.format;
    let mut session = Session::open(&global)?;

    match command {
        Commands::Home { lane } => run_home(&session, lane, format),
        Commands::Search { query } => run_search(&session, &query, format),
        Commands::Show(args) => run_show(&session, args, format),
        Commands::Browse(args) => run_browse(&session, args, format),
        Commands::Prefs(args) => run_prefs(&mut session, args, format),
        Commands::Versions => {
            output::print_versions(&session.preferences.selector(), format)
        }
        Commands::Config(args) => run_config(&session, args, format),
    }
}

fn run_home(session: &Session, only: Option<Lane>, format: OutputFormat) -> Result<()> {
    let client = session.client()?;
    let preferences = session.preferences.load();
    let mut page = HomePage::new(&session.config, session.card_context(&client));

    runtime()?.block_on(home::load_home(
        &mut page,
        &client,
        &preferences,
        &mut rand::thread_rng(),
    ));

    output::print_home(&page, &preferences, only, format)
}

fn run_search(session: &Session, query: &str, format: OutputFormat) -> Result<()> {
    let client = session.client()?;
    let context = session.card_context(&client);

    let view = runtime()?.block_on(search::load_search(
        &client,
        Some(query),
        &session.preferences,
        &context,
    ));

    output::print_search(&view, format)
}

fn run_show(session: &Session, args: ShowArgs, format: OutputFormat) -> Result<()> {
    let client = session.client()?;
    let mut request = DetailRequest::new(&args.package).with_prerelease(args.prerelease);
    if let Some(version) = args.kibana_version {
        request = request.with_version(version);
    }

    let runtime = runtime()?;
    let view = runtime.block_on(detail::open_detail(&client, Some(&request)));
    let mut page = match view {
        DetailView::Loaded(page) => page,
        other => anyhow::bail!("{}", other.message().unwrap_or_default()),
    };

    let mut missing = Vec::new();
    for dataset in &args.samples {
        match page.data_streams.iter().position(|p| &p.dataset == dataset) {
            Some(index) => runtime.block_on(page.toggle_panel(&client, index)),
            None => missing.push(dataset.as_str()),
        }
    }

    output::print_detail(&page, args.readme, &missing, format)
}

fn run_browse(session: &Session, args: BrowseArgs, format: OutputFormat) -> Result<()> {
    let client = session.client()?;
    let preferences = session.preferences.load();
    let context = session.card_context(&client);

    let mut categories = args.categories.into_iter();
    let preset = BrowsePreset {
        category: categories.next(),
        package_type: args.package_type,
        text: args.q,
    };

    let loaded = runtime()?.block_on(browse::load_browse(
        &client,
        &preferences,
        &preset,
        session.config.items_per_page,
    ));
    let mut page = match loaded {
        Ok(page) => page,
        Err(e) => anyhow::bail!("{} ({})", browse::LOAD_FAILED, e),
    };

    for category in categories {
        page.update(FilterMessage::CategoryToggled {
            category,
            checked: true,
        });
    }
    if let Some(owner) = args.owner {
        page.update(FilterMessage::OwnerSelected(owner));
    }
    page.update(FilterMessage::PageSelected(args.page));

    output::print_browse(&page, &page.view(&preferences, &context), format)
}

fn run_prefs(session: &mut Session, args: PrefsArgs, format: OutputFormat) -> Result<()> {
    let store = &mut session.preferences;
    let preferences = match args.command {
        PrefsSubcommand::Show => store.load(),
        PrefsSubcommand::SetVersion { version } => {
            let preferences = store.set_version(&version)?;
            if format == OutputFormat::Table {
                println!("✓ Kibana version set to {}", preferences.kibana_version);
            }
            preferences
        }
        PrefsSubcommand::Prerelease { state } => {
            let preferences = store.set_prerelease(state == Toggle::On)?;
            if format == OutputFormat::Table {
                println!(
                    "✓ Prerelease packages {}",
                    if preferences.include_prerelease {
                        "included"
                    } else {
                        "excluded"
                    }
                );
            }
            preferences
        }
        PrefsSubcommand::Reset => {
            let preferences = store.reset()?;
            if format == OutputFormat::Table {
                println!("✓ Preferences reset");
            }
            preferences
        }
    };

    output::print_preferences(&preferences, store.storage().path(), format)
}

fn run_config(session: &Session, args: ConfigArgs, format: OutputFormat) -> Result<()> {
    let store = &session.config_store;
    match args.command {
        ConfigSubcommand::Show => {
            output::print_config(&session.config, store.config_path(), format)
        }
        ConfigSubcommand::Init { force } => {
            if store.config_path().exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {} (use --force to overwrite)",
                    store.config_path().display()
                );
            }
            store.save(&CatalogConfig::default())?;
            println!("✓ Wrote {}", store.config_path().display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["epr"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.global.format, OutputFormat::Table);
    }

    #[test]
    fn show_parses_repeated_samples() {
        let cli = Cli::try_parse_from([
            "epr",
            "show",
            "nginx",
            "--kibana-version",
            "9.1.0",
            "--prerelease",
            "--sample",
            "nginx.access",
            "--sample",
            "nginx.error",
        ])
        .unwrap();

        let Some(Commands::Show(args)) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.package, "nginx");
        assert_eq!(args.kibana_version.as_deref(), Some("9.1.0"));
        assert!(args.prerelease);
        assert!(!args.readme);
        assert_eq!(args.samples, vec!["nginx.access", "nginx.error"]);
    }

    #[test]
    fn browse_parses_filters() {
        let cli = Cli::try_parse_from([
            "epr",
            "browse",
            "--category",
            "security",
            "--category",
            "cloud",
            "--type",
            "content",
            "--owner",
            "elastic",
            "--page",
            "3",
            "-o",
            "json",
        ])
        .unwrap();

        let Some(Commands::Browse(args)) = cli.command else {
            panic!("expected browse");
        };
        assert_eq!(args.categories, vec!["security", "cloud"]);
        assert_eq!(args.package_type.as_deref(), Some("content"));
        assert_eq!(args.owner.as_deref(), Some("elastic"));
        assert_eq!(args.page, 3);
        assert_eq!(cli.global.format, OutputFormat::Json);
    }

    #[test]
    fn browse_defaults_to_first_page() {
        let cli = Cli::try_parse_from(["epr", "browse"]).unwrap();
        let Some(Commands::Browse(args)) = cli.command else {
            panic!("expected browse");
        };
        assert_eq!(args.page, 1);
        assert!(args.categories.is_empty());
    }

    #[test]
    fn prefs_prerelease_requires_on_or_off() {
        assert!(Cli::try_parse_from(["epr", "prefs", "prerelease", "on"]).is_ok());
        assert!(Cli::try_parse_from(["epr", "prefs", "prerelease", "maybe"]).is_err());
    }

    #[test]
    fn global_paths_after_subcommand() {
        let cli = Cli::try_parse_from([
            "epr",
            "versions",
            "--config",
            "/tmp/epr.toml",
            "--session",
            "/tmp/session.toml",
        ])
        .unwrap();
        assert_eq!(cli.global.config, Some(PathBuf::from("/tmp/epr.toml")));
        assert_eq!(cli.global.session, Some(PathBuf::from("/tmp/session.toml")));
    }

    #[test]
    fn home_lane_parses_from_name() {
        let cli = Cli::try_parse_from(["epr", "home", "--lane", "security"]).unwrap();
        let Some(Commands::Home { lane }) = cli.command else {
            panic!("expected home");
        };
        assert_eq!(lane, Some(Lane::Security));
        assert!(Cli::try_parse_from(["epr", "home", "--lane", "logs"]).is_err());
    }

    #[test]
    fn search_requires_query() {
        assert!(Cli::try_parse_from(["epr", "search"]).is_err());
    }
}
