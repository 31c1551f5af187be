//! Price series types shared by providers, the cache and the calculators.

use chrono::{Days, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub close: f64,
    pub volume: u64,
}

/// Price history for one symbol, always held in ascending timestamp order.
///
/// Providers disagree on whether they return newest-first or oldest-first, so
/// every constructor sorts the points. Points with a non-finite close are
/// dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    symbol: String,
    points: Vec<PricePoint>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.retain(|p| p.close.is_finite());
        points.sort_by_key(|p| p.timestamp);
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// Placeholder for a symbol the provider could not resolve.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The point with the smallest timestamp.
    pub fn oldest(&self) -> Option<&PricePoint> {
        self.points.iter().min_by_key(|p| p.timestamp)
    }

    /// The point with the largest timestamp.
    pub fn newest(&self) -> Option<&PricePoint> {
        self.points.iter().max_by_key(|p| p.timestamp)
    }
}

/// Calendar date window requested from the provider for a lookback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Converts `lookback_days` trading days into a calendar window ending on `today`.
    /// Lookbacks reaching past the earliest representable date start there.
    pub fn for_lookback(today: NaiveDate, lookback_days: u32) -> Self {
        let calendar_days = (u64::from(lookback_days) * 365).div_ceil(252);
        Self {
            start: today
                .checked_sub_days(Days::new(calendar_days))
                .unwrap_or(NaiveDate::MIN),
            end: today,
        }
    }
}
