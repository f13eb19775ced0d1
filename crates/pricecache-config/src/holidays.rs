//! Holiday seed loading.

use chrono::NaiveDate;
use pricecache_core::calendar::is_weekend;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::settings::HolidaySettings;

/// Holiday seed errors.
#[derive(Error, Debug)]
pub enum HolidayError {
    #[error("Failed to read holiday file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid date {value:?} at {path}:{line}")]
    InvalidDate {
        path: PathBuf,
        line: usize,
        value: String,
    },
}

/// Merge inline dates and the holiday file. Weekends are dropped.
pub fn load_holidays(settings: &HolidaySettings) -> Result<BTreeSet<NaiveDate>, HolidayError> {
    let mut holidays: BTreeSet<NaiveDate> = settings.dates.iter().copied().collect();

    if let Some(path) = &settings.file {
        holidays.extend(read_holiday_file(path)?);
    }

    holidays.retain(|d| !is_weekend(*d));
    Ok(holidays)
}

/// One ISO date per line; blank lines and `#` comments are skipped.
fn read_holiday_file(path: &Path) -> Result<Vec<NaiveDate>, HolidayError> {
    let contents = std::fs::read_to_string(path).map_err(|source| HolidayError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut dates = Vec::new();
    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let date = NaiveDate::parse_from_str(line, "%Y-%m-%d").map_err(|_| {
            HolidayError::InvalidDate {
                path: path.to_path_buf(),
                line: idx + 1,
                value: line.to_string(),
            }
        })?;
        dates.push(date);
    }

    Ok(dates)
}
