//! Read-through cache for daily historical prices.
//!
//! A query expands its range token into the expected trading days, probes the
//! record store for each of them, and only on a miss asks the upstream for the
//! whole range. The upstream response is then reconciled against the expected
//! days: matching records are stored, expected days the upstream skipped are
//! learned as holidays.
//!
//! Dropping a query future cancels it. Holidays learned before that point are
//! kept; no other state survives.

use chrono::{NaiveDate, Utc};
use pricecache_core::calendar::{expected_trading_days, HolidayCalendar};
use pricecache_core::error::CacheResult;
use pricecache_core::traits::{HistoricalSource, RecordStore};
use pricecache_core::types::{normalize_symbol, HistoricalRecord, RangeToken, RecordKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// How an upstream response is aligned with the expected trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Look each expected day up in the response by date.
    #[default]
    ByDate,
    /// Walk expected days and response records with two cursors. A record
    /// that does not match the current expected day is never consumed.
    Positional,
}

/// What a reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Records written to the store
    pub stored: usize,
    /// Records the store refused
    pub store_failures: usize,
    /// Expected days the upstream skipped, in order
    pub learned_holidays: Vec<NaiveDate>,
}

/// Read-through historical price cache.
pub struct HistoricalPriceCache {
    store: Arc<dyn RecordStore>,
    source: Arc<dyn HistoricalSource>,
    holidays: HolidayCalendar,
    reconcile_mode: ReconcileMode,
}

impl HistoricalPriceCache {
    /// Create a cache over a store and an upstream source.
    pub fn new(
        store: Arc<dyn RecordStore>,
        source: Arc<dyn HistoricalSource>,
        holidays: HolidayCalendar,
    ) -> Self {
        Self {
            store,
            source,
            holidays,
            reconcile_mode: ReconcileMode::default(),
        }
    }

    /// Set the reconciliation mode.
    pub fn with_reconcile_mode(mut self, mode: ReconcileMode) -> Self {
        self.reconcile_mode = mode;
        self
    }

    /// The shared holiday set.
    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }

    /// Daily records for `symbol` over `range`, ending yesterday (UTC).
    pub async fn get_historical_prices(
        &self,
        symbol: &str,
        range: &str,
    ) -> CacheResult<Vec<HistoricalRecord>> {
        self.get_historical_prices_as_of(symbol, range, Utc::now().date_naive())
            .await
    }

    /// Daily records for `symbol` over `range`, with `today` excluded.
    ///
    /// Returns the stored records when every expected trading day is cached,
    /// otherwise the upstream's full response for the range.
    ///
    /// # Errors
    /// * `InvalidRange` - the token does not parse; nothing is touched
    /// * `Upstream` - the fetch failed; nothing is stored
    #[instrument(skip(self), fields(source = self.source.name(), store = self.store.name()))]
    pub async fn get_historical_prices_as_of(
        &self,
        symbol: &str,
        range: &str,
        today: NaiveDate,
    ) -> CacheResult<Vec<HistoricalRecord>> {
        if symbol.is_empty() || range.is_empty() {
            return Ok(Vec::new());
        }

        let symbol = normalize_symbol(symbol);
        let token: RangeToken = range.parse()?;
        let start = token.start_date(today)?;
        let expected = expected_trading_days(start, today, &self.holidays.snapshot());

        if expected.is_empty() {
            debug!(%start, %today, "No trading days in range");
            return Ok(Vec::new());
        }

        if let Some(records) = self.probe(&symbol, &expected).await {
            info!(
                symbol = %symbol,
                range = %range,
                records = records.len(),
                "Served from local store"
            );
            return Ok(records);
        }

        let fetched = self.source.fetch_historical(&symbol, range).await?;
        let summary = self.reconcile(&expected, &fetched).await;

        info!(
            symbol = %symbol,
            range = %range,
            expected_days = expected.len(),
            fetched = fetched.len(),
            stored = summary.stored,
            learned_holidays = summary.learned_holidays.len(),
            "Fetched from upstream and stored locally"
        );

        Ok(fetched)
    }

    /// Look up every expected day. `None` on the first miss.
    ///
    /// A failing lookup counts as a miss so the query still gets served.
    async fn probe(&self, symbol: &str, expected: &[NaiveDate]) -> Option<Vec<HistoricalRecord>> {
        let mut records = Vec::with_capacity(expected.len());

        for &date in expected {
            let key = RecordKey::new(symbol, date);
            match self.store.get(&key).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    debug!(%key, cached = records.len(), "Cache miss");
                    return None;
                }
                Err(e) => {
                    warn!(%key, error = %e, "Store lookup failed, falling back to upstream");
                    return None;
                }
            }
        }

        Some(records)
    }

    /// Align the upstream response with the expected days.
    pub async fn reconcile(
        &self,
        expected: &[NaiveDate],
        fetched: &[HistoricalRecord],
    ) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        match self.reconcile_mode {
            ReconcileMode::ByDate => {
                let by_date: HashMap<NaiveDate, &HistoricalRecord> =
                    fetched.iter().map(|r| (r.date, r)).collect();

                for &date in expected {
                    match by_date.get(&date) {
                        Some(record) => self.persist(record, &mut summary).await,
                        None => self.learn_holiday(date, &mut summary),
                    }
                }
            }
            ReconcileMode::Positional => {
                let mut cursor = fetched.iter().peekable();

                for &date in expected {
                    match cursor.peek() {
                        Some(&record) if record.date == date => {
                            self.persist(record, &mut summary).await;
                            cursor.next();
                        }
                        _ => self.learn_holiday(date, &mut summary),
                    }
                }
            }
        }

        summary
    }

    async fn persist(&self, record: &HistoricalRecord, summary: &mut ReconcileSummary) {
        match self.store.put(record.clone()).await {
            Ok(()) => summary.stored += 1,
            Err(e) => {
                warn!(key = %record.key(), error = %e, "Failed to store record");
                summary.store_failures += 1;
            }
        }
    }

    fn learn_holiday(&self, date: NaiveDate, summary: &mut ReconcileSummary) {
        if self.holidays.insert(date) {
            info!(%date, "Learned market holiday");
        }
        summary.learned_holidays.push(date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRecordStore;
    use async_trait::async_trait;
    use pricecache_core::error::{StoreError, UpstreamError};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(symbol: &str, day: NaiveDate, close: Decimal) -> HistoricalRecord {
        HistoricalRecord::new(
            symbol,
            day,
            close - dec!(1.5),
            close + dec!(2.25),
            close - dec!(2.75),
            close,
            1_000_000,
        )
    }

    /// Upstream fake that answers with a fixed response and counts calls.
    struct FakeSource {
        response: Mutex<Result<Vec<HistoricalRecord>, u16>>,
        calls: AtomicUsize,
        last_request: Mutex<Option<(String, String)>>,
    }

    impl FakeSource {
        fn returning(records: Vec<HistoricalRecord>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Ok(records)),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Err(status)),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HistoricalSource for FakeSource {
        async fn fetch_historical(
            &self,
            symbol: &str,
            range: &str,
        ) -> Result<Vec<HistoricalRecord>, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some((symbol.to_string(), range.to_string()));
            match &*self.response.lock().unwrap() {
                Ok(records) => Ok(records.clone()),
                Err(status) => Err(UpstreamError::Status {
                    status: *status,
                    body: "upstream unavailable".into(),
                }),
            }
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    /// Store wrapper that counts calls and can be told to fail.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryRecordStore,
        gets: AtomicUsize,
        puts: AtomicUsize,
        fail_gets: bool,
        fail_puts: bool,
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        async fn get(&self, key: &RecordKey) -> Result<Option<HistoricalRecord>, StoreError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            if self.fail_gets {
                return Err(StoreError::Serialization("corrupt row".into()));
            }
            self.inner.get(key).await
        }

        async fn put(&self, record: HistoricalRecord) -> Result<(), StoreError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            if self.fail_puts {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.inner.put(record).await
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn cache(
        store: &Arc<CountingStore>,
        source: &Arc<FakeSource>,
        holidays: HolidayCalendar,
    ) -> HistoricalPriceCache {
        HistoricalPriceCache::new(store.clone(), source.clone(), holidays)
    }

    fn msft_week() -> Vec<HistoricalRecord> {
        vec![
            record("MSFT", date(2024, 1, 3), dec!(370.60)),
            record("MSFT", date(2024, 1, 4), dec!(367.94)),
            record("MSFT", date(2024, 1, 5), dec!(367.75)),
        ]
    }

    #[tokio::test]
    async fn test_cold_miss_with_aligned_response() {
        let store = Arc::new(CountingStore::default());
        let source = FakeSource::returning(msft_week());
        let cache = cache(&store, &source, HolidayCalendar::default());

        let result = cache
            .get_historical_prices_as_of("msft", "5d", date(2024, 1, 8))
            .await
            .unwrap();

        assert_eq!(result, msft_week());
        assert_eq!(source.calls(), 1);
        assert_eq!(
            source.last_request.lock().unwrap().clone(),
            Some(("MSFT".to_string(), "5d".to_string()))
        );
        assert_eq!(
            store.inner.keys().await,
            vec![
                RecordKey::new("MSFT", date(2024, 1, 3)),
                RecordKey::new("MSFT", date(2024, 1, 4)),
                RecordKey::new("MSFT", date(2024, 1, 5)),
            ]
        );
        assert!(cache.holidays().is_empty());
    }

    #[tokio::test]
    async fn test_warm_hit_skips_upstream() {
        let store = Arc::new(CountingStore::default());
        let source = FakeSource::returning(msft_week());
        let cache = cache(&store, &source, HolidayCalendar::default());
        let today = date(2024, 1, 8);

        let first = cache.get_historical_prices_as_of("msft", "5d", today).await.unwrap();
        let puts_after_first = store.puts.load(Ordering::SeqCst);
        let second = cache.get_historical_prices_as_of("MSFT", "5d", today).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);
        assert_eq!(store.puts.load(Ordering::SeqCst), puts_after_first);
        assert_eq!(store.inner.len().await, 3);
    }

    #[tokio::test]
    async fn test_learns_holiday_skipped_by_upstream() {
        let store = Arc::new(CountingStore::default());
        let source = FakeSource::returning(vec![record("IBM", date(2024, 1, 2), dec!(163.55))]);
        let cache = cache(&store, &source, HolidayCalendar::default());
        let today = date(2024, 1, 3);

        let result = cache.get_historical_prices_as_of("ibm", "3d", today).await.unwrap();

        assert_eq!(result.len(), 1);
        assert!(cache.holidays().contains(date(2024, 1, 1)));
        assert_eq!(store.inner.keys().await, vec![RecordKey::new("IBM", date(2024, 1, 2))]);

        // The learned holiday makes the next identical query a full hit.
        let again = cache.get_historical_prices_as_of("IBM", "3d", today).await.unwrap();
        assert_eq!(again, result);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_positional_mode_learns_the_same_holiday() {
        let store = Arc::new(CountingStore::default());
        let source = FakeSource::returning(vec![record("IBM", date(2024, 1, 2), dec!(163.55))]);
        let cache = cache(&store, &source, HolidayCalendar::default())
            .with_reconcile_mode(ReconcileMode::Positional);

        cache
            .get_historical_prices_as_of("ibm", "3d", date(2024, 1, 3))
            .await
            .unwrap();

        assert!(cache.holidays().contains(date(2024, 1, 1)));
        assert_eq!(store.inner.len().await, 1);
    }

    #[tokio::test]
    async fn test_short_response_marks_trailing_days_as_holidays() {
        let store = Arc::new(CountingStore::default());
        let source = FakeSource::returning(vec![record("MSFT", date(2024, 1, 3), dec!(370.60))]);
        let cache = cache(&store, &source, HolidayCalendar::default())
            .with_reconcile_mode(ReconcileMode::Positional);

        let result = cache
            .get_historical_prices_as_of("msft", "5d", date(2024, 1, 8))
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert!(cache.holidays().contains(date(2024, 1, 4)));
        assert!(cache.holidays().contains(date(2024, 1, 5)));
    }

    #[tokio::test]
    async fn test_positional_mode_stalls_on_out_of_window_record() {
        let store = Arc::new(CountingStore::default());
        let mut response = vec![record("MSFT", date(2024, 1, 2), dec!(370.87))];
        response.extend(msft_week());
        let source = FakeSource::returning(response);
        let cache = cache(&store, &source, HolidayCalendar::default())
            .with_reconcile_mode(ReconcileMode::Positional);

        let result = cache
            .get_historical_prices_as_of("msft", "5d", date(2024, 1, 8))
            .await
            .unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(store.inner.len().await, 0);
        assert_eq!(cache.holidays().len(), 3);
    }

    #[tokio::test]
    async fn test_by_date_mode_ignores_out_of_window_records() {
        let store = Arc::new(CountingStore::default());
        let mut response = vec![record("MSFT", date(2024, 1, 2), dec!(370.87))];
        response.extend(msft_week());
        response.push(record("MSFT", date(2024, 1, 8), dec!(374.69)));
        let source = FakeSource::returning(response);
        let cache = cache(&store, &source, HolidayCalendar::default());

        let result = cache
            .get_historical_prices_as_of("msft", "5d", date(2024, 1, 8))
            .await
            .unwrap();

        // Everything is returned, only the expected days are stored.
        assert_eq!(result.len(), 5);
        assert_eq!(store.inner.len().await, 3);
        assert!(cache.holidays().is_empty());
    }

    #[tokio::test]
    async fn test_ytd_fill_then_full_hit() {
        let store = Arc::new(CountingStore::default());
        let today = date(2024, 6, 15);
        let days = expected_trading_days(date(2024, 1, 1), today, &Default::default());
        let response: Vec<_> = days
            .iter()
            .map(|d| record("AAPL", *d, dec!(184.25)))
            .collect();
        let source = FakeSource::returning(response.clone());
        let cache = cache(&store, &source, HolidayCalendar::default());

        let first = cache.get_historical_prices_as_of("aapl", "ytd", today).await.unwrap();
        let second = cache.get_historical_prices_as_of("aapl", "ytd", today).await.unwrap();

        assert_eq!(first.len(), response.len());
        assert_eq!(second, first);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_range_touches_nothing() {
        let store = Arc::new(CountingStore::default());
        let source = FakeSource::returning(msft_week());
        let cache = cache(&store, &source, HolidayCalendar::default());

        let err = cache
            .get_historical_prices_as_of("aapl", "7weeks", date(2024, 1, 8))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "invalid_range");
        assert_eq!(source.calls(), 0);
        assert_eq!(store.gets.load(Ordering::SeqCst), 0);
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_inputs_return_empty_list() {
        let store = Arc::new(CountingStore::default());
        let source = FakeSource::returning(msft_week());
        let cache = cache(&store, &source, HolidayCalendar::default());
        let today = date(2024, 1, 8);

        assert!(cache.get_historical_prices_as_of("", "5d", today).await.unwrap().is_empty());
        assert!(cache.get_historical_prices_as_of("msft", "", today).await.unwrap().is_empty());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_range_without_trading_days_skips_upstream() {
        let store = Arc::new(CountingStore::default());
        let source = FakeSource::returning(msft_week());
        let cache = cache(&store, &source, HolidayCalendar::default());

        // Mon 2024-01-08 minus two days only covers the weekend.
        let weekend = cache
            .get_historical_prices_as_of("msft", "2d", date(2024, 1, 8))
            .await
            .unwrap();
        let zero = cache
            .get_historical_prices_as_of("msft", "0d", date(2024, 1, 8))
            .await
            .unwrap();

        assert!(weekend.is_empty());
        assert!(zero.is_empty());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_error_persists_nothing() {
        let store = Arc::new(CountingStore::default());
        let source = FakeSource::failing(503);
        let cache = cache(&store, &source, HolidayCalendar::default());

        let err = cache
            .get_historical_prices_as_of("msft", "5d", date(2024, 1, 8))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "upstream_error");
        assert_eq!(err.upstream_status(), Some(503));
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
        assert!(cache.holidays().is_empty());
    }

    #[tokio::test]
    async fn test_store_read_failure_falls_through_to_upstream() {
        let store = Arc::new(CountingStore {
            fail_gets: true,
            ..Default::default()
        });
        let source = FakeSource::returning(msft_week());
        let cache = cache(&store, &source, HolidayCalendar::default());

        let result = cache
            .get_historical_prices_as_of("msft", "5d", date(2024, 1, 8))
            .await
            .unwrap();

        assert_eq!(result, msft_week());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_store_write_failure_still_returns_upstream_result() {
        let store = Arc::new(CountingStore {
            fail_puts: true,
            ..Default::default()
        });
        let source = FakeSource::returning(msft_week());
        let cache = cache(&store, &source, HolidayCalendar::default());

        let result = cache
            .get_historical_prices_as_of("msft", "5d", date(2024, 1, 8))
            .await
            .unwrap();

        assert_eq!(result, msft_week());
        assert_eq!(store.puts.load(Ordering::SeqCst), 3);
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test]
    async fn test_partial_coverage_refetches_whole_range() {
        let store = Arc::new(CountingStore::default());
        store
            .inner
            .put(record("MSFT", date(2024, 1, 3), dec!(370.60)))
            .await
            .unwrap();
        let source = FakeSource::returning(msft_week());
        let cache = cache(&store, &source, HolidayCalendar::default());

        let result = cache
            .get_historical_prices_as_of("msft", "5d", date(2024, 1, 8))
            .await
            .unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(source.calls(), 1);
        assert_eq!(store.inner.len().await, 3);
    }

    #[tokio::test]
    async fn test_symbol_case_shares_entries() {
        let store = Arc::new(CountingStore::default());
        let source = FakeSource::returning(msft_week());
        let cache = cache(&store, &source, HolidayCalendar::default());
        let today = date(2024, 1, 8);

        let lower = cache.get_historical_prices_as_of("msft", "5d", today).await.unwrap();
        let upper = cache.get_historical_prices_as_of("MSFT", "5d", today).await.unwrap();
        let mixed = cache.get_historical_prices_as_of("MsFt", "5d", today).await.unwrap();

        assert_eq!(lower, upper);
        assert_eq!(upper, mixed);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_seeded_holidays_are_not_expected() {
        let store = Arc::new(CountingStore::default());
        let source = FakeSource::returning(vec![record("IBM", date(2024, 1, 2), dec!(163.55))]);
        let cache = cache(&store, &source, HolidayCalendar::new([date(2024, 1, 1)]));

        cache
            .get_historical_prices_as_of("ibm", "3d", date(2024, 1, 3))
            .await
            .unwrap();

        assert_eq!(cache.holidays().len(), 1);
        assert_eq!(store.gets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_holiday_set_only_grows() {
        let store = Arc::new(CountingStore::default());
        let seed = [date(2023, 12, 25)];
        let source = FakeSource::returning(vec![]);
        let cache = cache(&store, &source, HolidayCalendar::new(seed));

        let mut sizes = vec![cache.holidays().len()];
        for range in ["3d", "5d", "1m"] {
            cache
                .get_historical_prices_as_of("ibm", range, date(2024, 1, 3))
                .await
                .unwrap();
            sizes.push(cache.holidays().len());
        }

        assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
        assert!(cache.holidays().contains(date(2023, 12, 25)));
    }

    #[tokio::test]
    async fn test_reconcile_summary() {
        let store = Arc::new(CountingStore::default());
        let source = FakeSource::returning(vec![]);
        let cache = cache(&store, &source, HolidayCalendar::default());
        let expected = [date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)];
        let fetched = [
            record("IBM", date(2024, 1, 2), dec!(163.55)),
            record("IBM", date(2024, 1, 3), dec!(161.10)),
        ];

        let summary = cache.reconcile(&expected, &fetched).await;

        assert_eq!(
            summary,
            ReconcileSummary {
                stored: 2,
                store_failures: 0,
                learned_holidays: vec![date(2024, 1, 1)],
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_share_one_consistent_state() {
        let store = Arc::new(CountingStore::default());
        let source = FakeSource::returning(vec![record("IBM", date(2024, 1, 2), dec!(163.55))]);
        let cache = Arc::new(cache(&store, &source, HolidayCalendar::default()));
        let today = date(2024, 1, 3);

        let mut handles = Vec::new();
        for symbol in ["ibm", "IBM", "Ibm", "iBM", "ibm", "IBM", "ibM", "IbM"] {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.get_historical_prices_as_of(symbol, "3d", today).await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result, vec![record("IBM", date(2024, 1, 2), dec!(163.55))]);
        }

        // No coalescing, so several misses may reach upstream, but every put
        // lands on the same key and the holiday is learned once.
        assert!((1..=8).contains(&source.calls()));
        assert_eq!(store.inner.keys().await, vec![RecordKey::new("IBM", date(2024, 1, 2))]);
        assert_eq!(cache.holidays().len(), 1);
        assert!(cache.holidays().contains(date(2024, 1, 1)));

        let warm = cache.get_historical_prices_as_of("IBM", "3d", today).await.unwrap();
        assert_eq!(warm.len(), 1);
        let calls = source.calls();
        cache.get_historical_prices_as_of("IBM", "3d", today).await.unwrap();
        assert_eq!(source.calls(), calls);
    }

    /// Store whose writes never finish.
    struct StalledStore;

    #[async_trait]
    impl RecordStore for StalledStore {
        async fn get(&self, _key: &RecordKey) -> Result<Option<HistoricalRecord>, StoreError> {
            Ok(None)
        }

        async fn put(&self, _record: HistoricalRecord) -> Result<(), StoreError> {
            std::future::pending::<Result<(), StoreError>>().await
        }

        fn name(&self) -> &str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn test_dropped_query_keeps_learned_holidays() {
        let source = FakeSource::returning(vec![record("IBM", date(2024, 1, 2), dec!(163.55))]);
        let cache = HistoricalPriceCache::new(
            Arc::new(StalledStore),
            source.clone(),
            HolidayCalendar::default(),
        );

        // 2024-01-01 is reconciled (and learned) before the put for 2024-01-02 stalls.
        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            cache.get_historical_prices_as_of("ibm", "3d", date(2024, 1, 3)),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(source.calls(), 1);
        assert!(cache.holidays().contains(date(2024, 1, 1)));
        assert_eq!(cache.holidays().len(), 1);
    }
}
