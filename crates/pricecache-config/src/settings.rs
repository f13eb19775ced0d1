//! Configuration structures.

use chrono::NaiveDate;
use pricecache_data::ReconcileMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub holidays: HolidaySettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "pricecache".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Daily-rolling log file, in addition to stderr
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Upstream market-data API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    pub base_url: String,
    /// Environment variable holding the API token
    pub token_env: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: "https://cloud.iexapis.com/stable".to_string(),
            token_env: "IEX_API_TOKEN".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Which record store backs the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Lost on exit
    Memory,
    /// CSV file at `cache.path`
    #[default]
    Csv,
}

/// Cache engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub store: StoreKind,
    pub path: PathBuf,
    pub reconcile: ReconcileMode,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            store: StoreKind::Csv,
            path: PathBuf::from("data/prices.csv"),
            reconcile: ReconcileMode::ByDate,
        }
    }
}

/// Seed for the market holiday set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HolidaySettings {
    /// Inline dates (YYYY-MM-DD)
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
    /// File with one date per line
    #[serde(default)]
    pub file: Option<PathBuf>,
}
