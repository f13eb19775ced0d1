//! Upstream market-data API clients.

mod iex;

pub use iex::{IexClient, IexConfig};
