//! Record store trait definitions.

use crate::error::StoreError;
use crate::types::{HistoricalRecord, RecordKey};
use async_trait::async_trait;

/// Persistent map from (symbol, date) to a daily record.
///
/// Implementations must make a `get` observe every earlier `put` made in the
/// same process. Durability is up to the implementation.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup.
    async fn get(&self, key: &RecordKey) -> Result<Option<HistoricalRecord>, StoreError>;

    /// Upsert under `record.key()`. Putting an equal record again is a no-op.
    async fn put(&self, record: HistoricalRecord) -> Result<(), StoreError>;

    /// Get the store name.
    fn name(&self) -> &str;
}
