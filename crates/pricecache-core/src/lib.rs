//! Core types and traits for the historical price cache.
//!
//! This crate provides the foundational building blocks including:
//! - Daily price records and their (symbol, date) keys
//! - Range token parsing ("ytd", "5d", "3m", "1y")
//! - The trading-day calendar and the learned holiday set
//! - Traits for record stores and upstream historical sources

pub mod calendar;
pub mod error;
pub mod traits;
pub mod types;

pub use calendar::{expected_trading_days, is_trading_day, is_weekend, HolidayCalendar};
pub use error::{CacheError, CacheResult, StoreError, UpstreamError};
pub use traits::*;
pub use types::*;
