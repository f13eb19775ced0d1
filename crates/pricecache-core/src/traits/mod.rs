//! Core traits for the price cache.

mod source;
mod store;

pub use source::HistoricalSource;
pub use store::RecordStore;
