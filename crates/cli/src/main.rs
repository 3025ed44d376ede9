mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use clap::{Parser, Subcommand};
use swipeaway_core::config::EngineConfig;
use swipeaway_core::domain::SortOrder;
use swipeaway_core::Swipeaway;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Swipeaway: swipe through your photo library, keep or delete
#[derive(Parser)]
#[command(name = "swipeaway", version, about)]
struct Cli {
    /// Photo directory to review
    #[arg(long, default_value = ".")]
    library: PathBuf,

    /// Path to the state database
    #[arg(long, default_value_t = default_data_path())]
    data: String,

    /// Engine config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the upgrade interstitial
    #[arg(long)]
    premium: bool,

    /// Group photos by UTC dates instead of the local offset
    #[arg(long)]
    utc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List month groups as sorted and filtered by the settings
    Months,
    /// Swipe through a review queue
    Review {
        #[command(subcommand)]
        mode: ReviewArg,
    },
    /// Show lifetime stats
    Stats,
    /// List bookmarked photos
    Bookmarks,
    /// Show or change settings
    Settings {
        /// most-recent, least-recent, most-photos or fewest-photos
        #[arg(long)]
        sort: Option<SortOrder>,
        /// Hide months that were fully reviewed
        #[arg(long)]
        hide_completed: Option<bool>,
        /// Haptic feedback on swipe
        #[arg(long)]
        haptics: Option<bool>,
    },
    /// Check free disk space and alert when low
    Storage,
}

#[derive(Subcommand, Clone)]
pub(crate) enum ReviewArg {
    /// The most recent month
    Recents,
    /// Every photo in random order
    Random,
    /// One month, e.g. 2024-06
    Month {
        /// Month id (YYYY-MM)
        id: String,
    },
    /// Photos taken on today's date in any year
    OnThisDay,
    /// Every photo, newest first
    All,
}

fn default_data_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".swipeaway")
        .join("state.db")
        .to_string_lossy()
        .to_string()
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swipeaway=info,swipeaway_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let offset = if cli.utc {
        FixedOffset::east_opt(0).context("invalid UTC offset")?
    } else {
        *chrono::Local::now().offset()
    };

    let mut app = Swipeaway::open(&cli.library, &PathBuf::from(&cli.data), config, offset)?;
    app.set_premium(cli.premium);
    tracing::debug!(library = %cli.library.display(), data = %cli.data, premium = cli.premium, "opened");
    for fault in app.faults() {
        eprintln!("  warning: {fault}");
    }

    match cli.command {
        Commands::Months => commands::months::run(&mut app)?,
        Commands::Review { mode } => commands::review::run(&mut app, mode)?,
        Commands::Stats => commands::stats::run(&app)?,
        Commands::Bookmarks => commands::bookmarks::run(&mut app)?,
        Commands::Settings {
            sort,
            hide_completed,
            haptics,
        } => commands::settings::run(&mut app, sort, hide_completed, haptics)?,
        Commands::Storage => commands::storage::run(&mut app)?,
    }

    Ok(())
}
