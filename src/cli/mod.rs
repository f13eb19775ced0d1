//! CLI definitions.

pub mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pricecache")]
#[command(author, version, about = "Read-through cache for daily historical equity prices")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "PRICECACHE_CONFIG")]
    pub config: PathBuf,

    /// Log level (defaults to logging.level from the configuration)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get daily historical prices through the cache
    History(HistoryArgs),
    /// List the seeded market holidays
    Holidays,
    /// Validate configuration
    ValidateConfig,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(clap::Args)]
pub struct HistoryArgs {
    /// Ticker symbol (case-insensitive)
    #[arg(short, long)]
    pub symbol: String,

    /// Range token: ytd, <N>d, <N>m or <N>y
    #[arg(short, long)]
    pub range: String,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Issue the same query this many times
    #[arg(long, default_value = "1")]
    pub repeat: u32,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub output: OutputFormat,
}
