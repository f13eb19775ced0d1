//! CSV-backed record store.

use async_trait::async_trait;
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use pricecache_core::error::StoreError;
use pricecache_core::traits::RecordStore;
use pricecache_core::types::{HistoricalRecord, RecordKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// CSV row format. Prices are written as strings so no precision is lost.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    symbol: String,
    date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    open: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    high: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    low: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    close: Decimal,
    volume: u64,
}

impl From<&HistoricalRecord> for CsvRow {
    fn from(r: &HistoricalRecord) -> Self {
        Self {
            symbol: r.symbol.clone(),
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
        }
    }
}

impl From<CsvRow> for HistoricalRecord {
    fn from(row: CsvRow) -> Self {
        HistoricalRecord::new(
            row.symbol,
            row.date,
            row.open,
            row.high,
            row.low,
            row.close,
            row.volume,
        )
    }
}

/// Append-only CSV file with an in-memory index.
///
/// The whole file is loaded on open. A `put` appends a row only when the key
/// is new or the record changed; on reload the last row for a key wins.
/// Rows that do not decode, such as one cut short by a crash, are skipped.
pub struct CsvRecordStore {
    path: PathBuf,
    records: RwLock<HashMap<RecordKey, HistoricalRecord>>,
}

impl CsvRecordStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = if path.exists() {
            Self::terminate_last_line(&path)?;
            Self::load_from_path(&path)?
        } else {
            HashMap::new()
        };

        debug!(path = %path.display(), records = records.len(), "Opened CSV record store");

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn load_from_path(path: &Path) -> Result<HashMap<RecordKey, HistoricalRecord>, StoreError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut records = HashMap::new();
        let mut skipped = 0usize;
        for result in reader.deserialize::<CsvRow>() {
            match result {
                Ok(row) => {
                    let record = HistoricalRecord::from(row);
                    records.insert(record.key(), record);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable CSV row");
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!(path = %path.display(), skipped, "CSV store loaded with unreadable rows");
        }

        Ok(records)
    }

    /// Make sure the file ends with a newline so the next append starts a
    /// fresh row instead of extending a torn one.
    fn terminate_last_line(path: &Path) -> Result<(), StoreError> {
        let mut file = OpenOptions::new().read(true).append(true).open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(());
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            file.write_all(b"\n")?;
        }
        Ok(())
    }

    fn append(&self, record: &HistoricalRecord) -> Result<(), StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer
            .serialize(CsvRow::from(record))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for CsvRecordStore {
    async fn get(&self, key: &RecordKey) -> Result<Option<HistoricalRecord>, StoreError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn put(&self, record: HistoricalRecord) -> Result<(), StoreError> {
        // Holding the write lock serializes appends.
        let mut records = self.records.write().await;
        let key = record.key();
        if records.get(&key) == Some(&record) {
            return Ok(());
        }

        self.append(&record)?;
        records.insert(key, record);
        Ok(())
    }

    fn name(&self) -> &str {
        "csv"
    }
}
