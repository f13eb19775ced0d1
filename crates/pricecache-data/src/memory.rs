//! In-memory record store.

use async_trait::async_trait;
use pricecache_core::error::StoreError;
use pricecache_core::traits::RecordStore;
use pricecache_core::types::{HistoricalRecord, RecordKey};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Simple in-memory record store. Contents live as long as the process.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<RecordKey, HistoricalRecord>>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// All keys, sorted.
    pub async fn keys(&self) -> Vec<RecordKey> {
        let mut keys: Vec<RecordKey> = self.records.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, key: &RecordKey) -> Result<Option<HistoricalRecord>, StoreError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn put(&self, record: HistoricalRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(record.key(), record);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
