//! Daily OHLCV records and their store keys.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalize a ticker for key construction and store access.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.to_uppercase()
}

/// One trading day of OHLCV data for a symbol.
///
/// Prices are `Decimal` and cross the JSON boundary as numbers without going
/// through `f64`, so `184.22` stays `184.22`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    /// Ticker, uppercase
    pub symbol: String,
    /// Trading date
    pub date: NaiveDate,
    /// Opening price
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub open: Decimal,
    /// Highest price
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub high: Decimal,
    /// Lowest price
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub low: Decimal,
    /// Closing price
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub close: Decimal,
    /// Shares traded
    pub volume: u64,
}

impl HistoricalRecord {
    /// Create a new record.
    pub fn new(
        symbol: impl Into<String>,
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: u64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// The key this record is stored under. The record's own date wins.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.symbol, self.date)
    }
}

/// Composite primary key of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    symbol: String,
    date: NaiveDate,
}

impl RecordKey {
    /// Create a key, uppercasing the symbol.
    pub fn new(symbol: &str, date: NaiveDate) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            date,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Renders the persisted key layout, `SYMBOL|YYYY-MM-DD`.
impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.symbol, self.date.format("%Y-%m-%d"))
    }
}
