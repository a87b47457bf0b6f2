use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod repo;

use commands::{
    CompareCommand, ConfigCommand, DraftCommand, HistoryCommand, RecipeCommand, VersionCommand,
};
use config::Config;
use repo::Workspace;

#[derive(Parser)]
#[command(name = "bar")]
#[command(version)]
#[command(about = "Cocktail recipe version management", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage recipes and edit their versions
    Recipe(RecipeCommand),

    /// Branch, publish, archive, promote, and merge versions
    Version(VersionCommand),

    /// Compare two versions and get a recommendation
    Compare(CompareCommand),

    /// Show a recipe family's version history
    History(HistoryCommand),

    /// Inspect, apply, or discard autosaved drafts
    Draft(DraftCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for init command
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;
    let workspace = Workspace::new(&config);

    match &cli.command {
        Some(Commands::Recipe(cmd)) => cmd.run(&workspace, &config),
        Some(Commands::Version(cmd)) => cmd.run(&workspace),
        Some(Commands::Compare(cmd)) => cmd.run(&workspace),
        Some(Commands::History(cmd)) => cmd.run(&workspace),
        Some(Commands::Draft(cmd)) => cmd.run(&workspace),
        Some(Commands::Config(cmd)) => cmd.run(&config, cli_config_path),
        None => {
            println!("Use --help to see available commands");
            Ok(())
        }
    }
}
