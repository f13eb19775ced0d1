//! Core data types for the price cache.

mod range;
mod record;

pub use range::RangeToken;
pub use record::{normalize_symbol, HistoricalRecord, RecordKey};
