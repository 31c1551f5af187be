//! Period return and relative performance between two series.

use super::series::Series;
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// Strictly positive is bullish; zero counts as bearish.
    pub fn from_value(value: f64) -> Self {
        if value > 0.0 {
            Trend::Bullish
        } else {
            Trend::Bearish
        }
    }
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Trend::Bullish => "bullish",
                Trend::Bearish => "bearish",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelativePerformance {
    pub subject_symbol: String,
    pub reference_symbol: String,
    /// Percentage points.
    pub value: f64,
    pub trend: Trend,
}

impl RelativePerformance {
    pub fn compute(subject: &Series, reference: &Series) -> Self {
        let value = relative_performance(subject, reference);
        Self {
            subject_symbol: subject.symbol().to_string(),
            reference_symbol: reference.symbol().to_string(),
            value,
            trend: Trend::from_value(value),
        }
    }
}

/// Percentage change from the oldest to the newest point, located by
/// timestamp. Zero for fewer than two points or a zero starting close.
pub fn period_return(series: &Series) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let (Some(oldest), Some(newest)) = (series.oldest(), series.newest()) else {
        return 0.0;
    };
    if oldest.close == 0.0 {
        return 0.0;
    }
    (newest.close - oldest.close) / oldest.close * 100.0
}

pub fn relative_performance(subject: &Series, reference: &Series) -> f64 {
    period_return(subject) - period_return(reference)
}
