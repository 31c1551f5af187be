//! Ranks an instrument's holdings by performance relative to the instrument.

use super::instrument::Instrument;
use super::performance::relative_performance;
use super::series::Series;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldingTag {
    Outperforming,
    Underperforming,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingRankEntry {
    pub holding_symbol: String,
    pub relative_performance: f64,
    pub tag: HoldingTag,
}

impl HoldingRankEntry {
    pub fn new(holding_symbol: &str, relative_performance: f64) -> Self {
        let tag = if relative_performance > 0.0 {
            HoldingTag::Outperforming
        } else {
            HoldingTag::Underperforming
        };
        Self {
            holding_symbol: holding_symbol.to_string(),
            relative_performance,
            tag,
        }
    }
}

/// Scores every holding with a resolved series against the parent series and
/// sorts them best first. Holdings with no data are left out rather than
/// scored as zero.
pub fn rank_holdings(
    instrument: &Instrument,
    parent: &Series,
    series: &HashMap<String, Series>,
) -> Vec<HoldingRankEntry> {
    let mut ranked: Vec<HoldingRankEntry> = instrument
        .holdings
        .iter()
        .filter_map(|symbol| {
            series
                .get(symbol)
                .filter(|s| !s.is_empty())
                .map(|s| HoldingRankEntry::new(symbol, relative_performance(s, parent)))
        })
        .collect();
    sort_descending(&mut ranked);
    ranked
}

pub(crate) fn sort_descending(entries: &mut [HoldingRankEntry]) {
    entries.sort_by(|a, b| b.relative_performance.total_cmp(&a.relative_performance));
}

/// First `n` entries of a best-first ranking.
pub fn top_performers(ranked: &[HoldingRankEntry], n: usize) -> Vec<HoldingRankEntry> {
    ranked.iter().take(n).cloned().collect()
}

/// Last `n` entries of a best-first ranking, worst first.
pub fn worst_performers(ranked: &[HoldingRankEntry], n: usize) -> Vec<HoldingRankEntry> {
    ranked.iter().rev().take(n).cloned().collect()
}
