use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "bizquest")]
#[command(about = "Points, levels and badges for your small business")]
#[command(version)]
struct Cli {
    /// User whose progress to use (defaults to settings.default_user)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Path to the config file (defaults to ~/.bizquest/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the progress database (overrides settings.database_path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show points, level and badges
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add points (negative values subtract, never below zero)
    AddPoints {
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },

    /// Grant a badge (no-op if already earned)
    EarnBadge { badge_id: String },

    /// Spend points on a reward
    Redeem { cost: u64 },

    /// Record a business action (add-client, add-quote, convert-quote, ...)
    Record { action: String },

    /// Show the level threshold table
    Levels {
        /// Highest level to list
        #[arg(long, default_value_t = 12)]
        up_to: u32,
    },

    /// List known badges and which ones are earned
    Badges,

    /// Initialize a new config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Delete all progress of the user
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config;
    let db_path = cli.db;
    let user = cli.user;
    // Init must work before any config exists, so the context is opened per command
    let open = || cli::CliContext::open(config_path.as_deref(), db_path.clone(), user.clone());

    match cli.command.unwrap_or(Commands::Status { json: false }) {
        Commands::Init { force } => cli::init::init_command(config_path.clone(), force).await?,
        Commands::Status { json } => cli::status::status_command(&open()?, json).await?,
        Commands::AddPoints { delta } => cli::points::add_points_command(&open()?, delta).await?,
        Commands::EarnBadge { badge_id } => {
            cli::badge::earn_badge_command(&open()?, &badge_id).await?
        }
        Commands::Redeem { cost } => cli::points::redeem_command(&open()?, cost).await?,
        Commands::Record { action } => cli::points::record_command(&open()?, &action).await?,
        Commands::Levels { up_to } => cli::levels::levels_command(up_to),
        Commands::Badges => cli::badge::badges_command(&open()?).await?,
        Commands::Reset => cli::status::reset_command(&open()?)?,
    }

    Ok(())
}
