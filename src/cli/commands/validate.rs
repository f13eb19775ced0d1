//! Validate configuration command.

use anyhow::Result;
use config::ConfigError;
use pricecache_config::{load_holidays, AppConfig};
use std::path::Path;

pub async fn run(config: Result<AppConfig, ConfigError>, config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match config {
        Ok(config) => {
            let holidays = load_holidays(&config.holidays)?;

            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Upstream: {}", config.upstream.base_url);
            println!("Token variable: {}", config.upstream.token_env);
            println!("Store: {:?} ({})", config.cache.store, config.cache.path.display());
            println!("Reconcile mode: {:?}", config.cache.reconcile);
            println!("Seeded holidays: {}", holidays.len());
            println!();
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
