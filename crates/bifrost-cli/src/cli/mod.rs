//! CLI entry and dispatch.

use anyhow::{Context, Result};
use bifrost_core::{config, logging};
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "bifrost")]
#[command(version)]
#[command(about = "Sign in with Google and look up Minecraft profiles")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Backend base URL (overrides config and BIFROST_BACKEND_URL)
    #[arg(long, global = true, value_name = "URL")]
    backend_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the interactive UI (default)
    Ui,
    /// Look up a Minecraft profile by username
    Profile {
        /// Minecraft username, sent as typed
        #[arg(value_name = "USERNAME")]
        username: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Write a commented default config file
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        backend_url,
    } = cli;

    if let Some(Commands::Config { command }) = &command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => {
                tracing::info!(command = "config init", "dispatching");
                commands::config::init()
            }
        };
    }

    let mut config = config::Config::load().context("load config")?;
    if let Some(url) = backend_url {
        config.backend_url = url;
    }

    match command {
        None | Some(Commands::Ui) => {
            tracing::info!(command = "ui", backend = %config.backend_url, "dispatching");
            commands::ui::run(&config).await
        }
        Some(Commands::Profile { username }) => {
            tracing::info!(command = "profile", backend = %config.backend_url, "dispatching");
            commands::profile::run(&config, &username).await
        }
        Some(Commands::Config { .. }) => Ok(()),
    }
}
