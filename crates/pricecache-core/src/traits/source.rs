//! Upstream historical source trait definitions.

use crate::error::UpstreamError;
use crate::types::HistoricalRecord;
use async_trait::async_trait;

/// Third-party market-data API returning daily records.
#[async_trait]
pub trait HistoricalSource: Send + Sync {
    /// Fetch daily records for a symbol over a range token.
    ///
    /// # Arguments
    /// * `symbol` - Uppercase ticker
    /// * `range` - Range token as the caller gave it ("5d", "ytd", ...)
    ///
    /// # Returns
    /// One record per trading day the upstream recognizes, oldest first.
    /// The days need not line up with the local calendar.
    async fn fetch_historical(
        &self,
        symbol: &str,
        range: &str,
    ) -> Result<Vec<HistoricalRecord>, UpstreamError>;

    /// Get the source name.
    fn name(&self) -> &str;
}
