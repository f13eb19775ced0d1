//! Configuration management.

mod holidays;
mod settings;

pub use holidays::{load_holidays, HolidayError};
pub use settings::{
    AppConfig, AppSettings, CacheSettings, HolidaySettings, LoggingConfig, StoreKind,
    UpstreamSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("PRICECACHE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}
