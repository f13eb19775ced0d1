//! History command implementation.

use anyhow::Result;
use chrono::Utc;
use config::ConfigError;
use pricecache_config::{load_holidays, AppConfig, StoreKind};
use pricecache_core::{
    CacheError, CacheResult, HistoricalRecord, HolidayCalendar, RecordStore, StoreError,
};
use pricecache_data::{CsvRecordStore, HistoricalPriceCache, MemoryRecordStore};
use pricecache_upstream::{IexClient, IexConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::cli::{HistoryArgs, OutputFormat};

pub async fn run(
    args: HistoryArgs,
    config: Result<AppConfig, ConfigError>,
    config_path: &Path,
) -> Result<()> {
    let config = config.map_err(|e| {
        report(CacheError::Config(format!(
            "failed to load {}: {}",
            config_path.display(),
            e
        )))
    })?;
    let cache = build_cache(&config).map_err(report)?;
    let today = args.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let mut records = Vec::new();
    for attempt in 1..=args.repeat.max(1) {
        let started = Instant::now();
        match cache
            .get_historical_prices_as_of(&args.symbol, &args.range, today)
            .await
        {
            Ok(result) => {
                info!(
                    attempt,
                    records = result.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Query complete"
                );
                records = result;
            }
            Err(e) => return Err(report(e)),
        }
    }

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Table => print_table(&records),
    }

    if !cache.holidays().is_empty() {
        info!(holidays = cache.holidays().len(), "Holiday set size at exit");
    }

    Ok(())
}

/// Print the structured failure object and hand the error back to `main`.
fn report(e: CacheError) -> anyhow::Error {
    let failure = serde_json::json!({
        "error": {
            "kind": e.kind(),
            "message": e.to_string(),
            "upstream_status": e.upstream_status(),
        }
    });
    println!("{:#}", failure);
    anyhow::Error::new(e).context("Query failed")
}

/// Wire the store, upstream client and holiday seed from configuration.
fn build_cache(config: &AppConfig) -> CacheResult<HistoricalPriceCache> {
    let holidays =
        load_holidays(&config.holidays).map_err(|e| CacheError::Config(e.to_string()))?;

    let store: Arc<dyn RecordStore> = match config.cache.store {
        StoreKind::Memory => Arc::new(MemoryRecordStore::new()),
        StoreKind::Csv => {
            if let Some(dir) = config.cache.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(StoreError::from)?;
            }
            Arc::new(CsvRecordStore::open(&config.cache.path)?)
        }
    };

    let iex_config =
        IexConfig::from_env(config.upstream.base_url.clone(), &config.upstream.token_env)?
            .with_timeout(Duration::from_secs(config.upstream.timeout_secs));
    let source = Arc::new(IexClient::new(iex_config)?);

    info!(
        store = store.name(),
        holidays = holidays.len(),
        reconcile = ?config.cache.reconcile,
        "Cache ready"
    );

    Ok(
        HistoricalPriceCache::new(store, source, HolidayCalendar::new(holidays))
            .with_reconcile_mode(config.cache.reconcile),
    )
}

fn print_table(records: &[HistoricalRecord]) {
    println!(
        "{:<8} {:<10} {:>12} {:>12} {:>12} {:>12} {:>14}",
        "SYMBOL", "DATE", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME"
    );
    for r in records {
        println!(
            "{:<8} {:<10} {:>12} {:>12} {:>12} {:>12} {:>14}",
            r.symbol, r.date, r.open, r.high, r.low, r.close, r.volume
        );
    }
    println!("{} records", records.len());
}
