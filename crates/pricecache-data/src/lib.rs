//! Record stores and the read-through historical price cache.

mod csv_store;
mod engine;
mod memory;

pub use csv_store::CsvRecordStore;
pub use engine::{HistoricalPriceCache, ReconcileMode, ReconcileSummary};
pub use memory::MemoryRecordStore;
