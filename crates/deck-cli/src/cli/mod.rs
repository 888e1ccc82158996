//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use deck_engine::config::Config;

mod commands;

#[derive(Parser)]
#[command(name = "deck")]
#[command(version)]
#[command(about = "Interactive terminal walkthroughs of agent sessions")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Start at a specific module (by id, see `deck modules`)
    #[arg(long, value_name = "ID")]
    module: Option<String>,

    /// Playback speed multiplier (2.0 = twice as fast)
    #[arg(long, value_name = "SPEED")]
    speed: Option<f64>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List the available modules
    Modules,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = crate::logging::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;

    // default to the walkthrough
    let Some(command) = cli.command else {
        return deck_tui::run_walkthrough(&config, cli.module.as_deref(), cli.speed).await;
    };

    match command {
        Commands::Modules => commands::modules::list(),
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
