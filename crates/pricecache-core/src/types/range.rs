//! Relative range tokens ("ytd", "5d", "3m", "1y").

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CacheError;

/// Lookback window relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeToken {
    /// January 1 of the current year
    YearToDate,
    /// N calendar days back
    Days(u32),
    /// N calendar months back
    Months(u32),
    /// N calendar years back
    Years(u32),
}

impl RangeToken {
    /// First date covered by this range, given today's date.
    ///
    /// Month and year arithmetic clamps to the end of the target month,
    /// so "1m" on 2024-03-31 starts on 2024-02-29.
    pub fn start_date(&self, today: NaiveDate) -> Result<NaiveDate, CacheError> {
        let start = match *self {
            RangeToken::YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1),
            RangeToken::Days(n) => today.checked_sub_days(Days::new(u64::from(n))),
            RangeToken::Months(n) => today.checked_sub_months(Months::new(n)),
            RangeToken::Years(n) => n
                .checked_mul(12)
                .and_then(|months| today.checked_sub_months(Months::new(months))),
        };
        start.ok_or_else(|| CacheError::InvalidRange(format!("{} is out of range", self)))
    }
}

impl fmt::Display for RangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeToken::YearToDate => write!(f, "ytd"),
            RangeToken::Days(n) => write!(f, "{}d", n),
            RangeToken::Months(n) => write!(f, "{}m", n),
            RangeToken::Years(n) => write!(f, "{}y", n),
        }
    }
}

impl FromStr for RangeToken {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "ytd" {
            return Ok(RangeToken::YearToDate);
        }

        let invalid = || CacheError::InvalidRange(s.to_string());

        let unit = s.chars().last().ok_or_else(invalid)?;
        if !unit.is_ascii() {
            return Err(invalid());
        }
        let (count, _) = s.split_at(s.len() - 1);

        // u32::from_str accepts a leading '+', so check digits by hand.
        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let n: u32 = count.parse().map_err(|_| invalid())?;

        match unit {
            'd' => Ok(RangeToken::Days(n)),
            'm' => Ok(RangeToken::Months(n)),
            'y' => Ok(RangeToken::Years(n)),
            _ => Err(invalid()),
        }
    }
}
