mod cli;
mod commands;
mod lock;
mod report;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use core_runtime::config::AppConfig;
use core_runtime::logging::init_logging;
use tracing::debug;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.logging_config()).context("Failed to initialize logging")?;

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_overrides(&cli.overrides());
    config.validate().context("Invalid configuration")?;
    debug!(config = ?config, "Configuration loaded");

    match &cli.command {
        Some(Commands::Sync { target }) => {
            commands::SyncLibrary::execute(target, &config, cli.verbose)
                .await
                .context("Failed to execute sync command")?;
        }
        Some(Commands::Cancel) => {
            commands::Cancel::execute(&config).context("Failed to execute cancel command")?;
        }
        Some(Commands::Health) => {
            commands::Health::execute(&config)
                .await
                .context("Failed to execute health command")?;
        }
        None if config.schedule.enabled => {
            commands::Schedule::execute(&config, cli.verbose)
                .await
                .context("Failed to run scheduler")?;
        }
        None => {
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
