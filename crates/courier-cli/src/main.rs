use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use courier_core::message::TargetKind;
use courier_infrastructure::ConfigService;
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Courier - user and group messaging from the terminal", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/courier/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a conversation and keep it refreshed; lines typed on stdin are sent
    Watch {
        #[command(flatten)]
        target: TargetArgs,

        /// Print the conversation once and exit
        #[arg(long)]
        once: bool,
    },
    /// Send a single message
    Send {
        #[command(flatten)]
        target: TargetArgs,

        /// Message text
        content: String,
    },
    /// Delete a message by id
    Delete {
        id: String,
    },
    /// Show the logged-in username
    Whoami,
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config file if none exists
    Init,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct TargetArgs {
    /// Conversation with a user
    #[arg(long)]
    user: Option<String>,

    /// Conversation with a group
    #[arg(long)]
    group: Option<String>,
}

impl TargetArgs {
    fn resolve(&self) -> (TargetKind, &str) {
        match (&self.user, &self.group) {
            (Some(user), _) => (TargetKind::User, user),
            (None, Some(group)) => (TargetKind::Group, group),
            // clap enforces exactly one of the two
            (None, None) => (TargetKind::User, ""),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new_default().context("Failed to locate config directory")?,
    };
    let config = service
        .load()
        .with_context(|| format!("Failed to load config from {}", service.path().display()))?;

    logging::init(&config.logging)?;

    match cli.command {
        Commands::Watch { target, once } => {
            let (kind, name) = target.resolve();
            commands::watch::run(&config, kind, name, once).await?
        }
        Commands::Send { target, content } => {
            let (kind, name) = target.resolve();
            commands::send::run(&config, kind, name, &content).await?
        }
        Commands::Delete { id } => commands::delete::run(&config, &id).await?,
        Commands::Whoami => commands::whoami::run(&config).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&service, &config)?,
            ConfigAction::Init => commands::config::init(&service)?,
        },
    }

    Ok(())
}
