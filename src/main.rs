//! Historical price cache CLI application.

mod cli;
mod logging;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use logging::setup_logging;
use pricecache_config::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config errors are reported by the command that needs the config.
    let config = load_config(&cli.config);

    // Setup logging
    let log_level = match (&cli.log_level, &config) {
        (Some(level), _) => level.as_str().to_string(),
        (None, Ok(config)) => config.logging.level.clone(),
        (None, Err(_)) => "info".to_string(),
    };
    let json_logs = cli.json_logs
        || matches!(&config, Ok(config) if config.logging.format == "json");
    let log_file = config.as_ref().ok().and_then(|c| c.logging.file.clone());
    let _log_guard = setup_logging(&log_level, json_logs, log_file.as_deref());

    // Execute command
    match cli.command {
        Commands::History(args) => cli::commands::history::run(args, config, &cli.config).await,
        Commands::Holidays => cli::commands::holidays::run(config, &cli.config).await,
        Commands::ValidateConfig => cli::commands::validate::run(config, &cli.config).await,
    }
}
