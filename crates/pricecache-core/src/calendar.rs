//! Trading-day calendar.
//!
//! Expected trading days are the weekdays in `[start, end)` that are not in
//! the holiday set. The holiday set starts from configuration and grows when
//! the upstream skips a day this calendar expected.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

/// Saturday or Sunday.
#[inline]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// A weekday that is not a known holiday.
#[inline]
pub fn is_trading_day(date: NaiveDate, holidays: &BTreeSet<NaiveDate>) -> bool {
    !is_weekend(date) && !holidays.contains(&date)
}

/// Ordered trading days in `[start, end)`. Empty when `start >= end`.
pub fn expected_trading_days(
    start: NaiveDate,
    end: NaiveDate,
    holidays: &BTreeSet<NaiveDate>,
) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d < end)
        .filter(|d| is_trading_day(*d, holidays))
        .collect()
}

/// Process-wide set of market holidays.
///
/// Readers take an immutable snapshot; writers swap in a new set, so a
/// reader never sees a half-applied update. Cloning shares the same set.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    inner: Arc<RwLock<Arc<BTreeSet<NaiveDate>>>>,
}

impl HolidayCalendar {
    /// Create a calendar seeded with the given dates. Weekends are dropped.
    pub fn new(seed: impl IntoIterator<Item = NaiveDate>) -> Self {
        let set: BTreeSet<NaiveDate> = seed.into_iter().filter(|d| !is_weekend(*d)).collect();
        Self {
            inner: Arc::new(RwLock::new(Arc::new(set))),
        }
    }

    /// Current holiday set.
    pub fn snapshot(&self) -> Arc<BTreeSet<NaiveDate>> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            // A panicking writer never leaves a partial set behind.
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Record a holiday. Returns `true` if the date was newly added.
    ///
    /// Weekends are never stored; inserting one is a no-op.
    pub fn insert(&self, date: NaiveDate) -> bool {
        if is_weekend(date) {
            return false;
        }

        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.contains(&date) {
            return false;
        }
        let mut next = BTreeSet::clone(&guard);
        next.insert(date);
        *guard = Arc::new(next);
        true
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.snapshot().contains(&date)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
