//! codepad CLI - Command-line interface for the codepad project store
//!
//! Provides `codepad project`, `codepad file`, `codepad setting` and
//! `codepad reset`.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use codepad_core::{ProjectStore, StoreConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::file::FileCommands;
use commands::project::ProjectCommands;
use commands::setting::SettingCommands;

#[derive(Parser)]
#[command(name = "codepad")]
#[command(about = "codepad - project and file store for the codepad editor")]
#[command(version)]
struct Cli {
    /// Database file (overrides the config file)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Config file (defaults to $CODEPAD_CONFIG or codepad.toml in the data directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log store operations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// Manage files inside a project
    File {
        #[command(subcommand)]
        action: FileCommands,
    },
    /// Manage global settings
    Setting {
        #[command(subcommand)]
        action: SettingCommands,
    },
    /// Delete all projects, files and settings
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("CODEPAD_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config =
        StoreConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(db) = cli.db {
        config = config.with_database_path(db);
    }

    let store = ProjectStore::new(&config);
    store.initialize().await.with_context(|| {
        format!(
            "Failed to open database at {}",
            config.database_path().display()
        )
    })?;

    match cli.command {
        Commands::Project { action } => commands::project::execute(action, &store).await,
        Commands::File { action } => commands::file::execute(action, &store).await,
        Commands::Setting { action } => commands::setting::execute(action, &store).await,
        Commands::Reset { force } => {
            if !force && !commands::confirm("Delete ALL projects, files and settings?")? {
                println!("Cancelled.");
                return Ok(());
            }
            store.clear_all().await?;
            println!("All data cleared.");
            Ok(())
        }
    }
}
