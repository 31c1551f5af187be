//! Cache key and time source used by the series cache.

use chrono::{DateTime, NaiveDate, Utc};

use super::series::DateRange;

/// Source of the current time, injectable so TTL expiry is deterministic in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SeriesKey {
    pub fn new(symbol: &str, range: DateRange) -> Self {
        Self {
            symbol: symbol.to_string(),
            start: range.start,
            end: range.end,
        }
    }
}
