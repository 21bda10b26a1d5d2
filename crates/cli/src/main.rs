//! Ait CLI — the main entry point.
//!
//! Commands:
//! - `onboard`  — Write the default config
//! - `session`  — Interactive query → context → response → store loop
//! - `history`  — List, forget, clear or reset stored experiences
//! - `token`    — Save or remove the API token
//! - `status`   — Show configuration and store status

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ait",
    about = "Ait — curate context, edit answers, keep the experience",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Onboard,

    /// Start an interactive session
    Session,

    /// Manage stored experiences
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },

    /// Manage the saved API token
    Token {
        #[command(subcommand)]
        action: TokenCommand,
    },

    /// Show configuration and store status
    Status,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// Show the most recent experiences
    List {
        /// How many to show (default: `memory.recent_count`)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Remove one experience by id or id prefix
    Forget { id: String },

    /// Delete every stored experience
    Clear {
        #[arg(long)]
        confirm: bool,
    },

    /// Replace the history with the default experiences
    Reset {
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Subcommand)]
enum TokenCommand {
    /// Save a token (an empty value removes it)
    Set { value: String },

    /// Remove the saved token
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Session => commands::session::run().await?,
        Commands::History { action } => match action {
            HistoryCommand::List { count } => commands::history::list(count).await?,
            HistoryCommand::Forget { id } => commands::history::forget(&id).await?,
            HistoryCommand::Clear { confirm } => commands::history::clear(confirm).await?,
            HistoryCommand::Reset { confirm } => commands::history::reset(confirm).await?,
        },
        Commands::Token { action } => match action {
            TokenCommand::Set { value } => commands::token::set(&value).await?,
            TokenCommand::Clear => commands::token::clear().await?,
        },
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
