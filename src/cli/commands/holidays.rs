//! List holidays command.

use anyhow::{Context, Result};
use config::ConfigError;
use pricecache_config::{load_holidays, AppConfig};
use std::path::Path;

pub async fn run(config: Result<AppConfig, ConfigError>, config_path: &Path) -> Result<()> {
    let config = config
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;
    let holidays = load_holidays(&config.holidays).context("Failed to load holidays")?;

    println!("Seeded Market Holidays");
    println!("═══════════════════════════════════════════════════════════");
    for date in &holidays {
        println!("  {} {}", date, date.format("%a"));
    }
    println!();
    println!("{} holidays. Weekends are excluded automatically.", holidays.len());

    Ok(())
}
