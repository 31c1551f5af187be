//! Static instrument catalog and universe building.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub holdings: Vec<String>,
}

impl Instrument {
    pub fn new(symbol: &str, name: &str, category: &str, holdings: &[&str]) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            holdings: holdings.iter().map(|h| h.to_string()).collect(),
        }
    }
}

/// Tracked instruments plus the benchmark every instrument is measured against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub benchmark: String,
    pub instruments: Vec<Instrument>,
}

impl Catalog {
    /// Every symbol needed for one timeframe: instruments, their holdings and
    /// the benchmark, deduplicated.
    pub fn universe(&self) -> BTreeSet<String> {
        self.instruments
            .iter()
            .flat_map(|i| std::iter::once(&i.symbol).chain(i.holdings.iter()))
            .chain(std::iter::once(&self.benchmark))
            .cloned()
            .collect()
    }

    /// US sector SPDR funds and their largest holdings, benchmarked against SPY.
    pub fn default_sectors() -> Self {
        let instruments = vec![
            Instrument::new(
                "XLK",
                "Technology Select Sector SPDR",
                "sector",
                &["AAPL", "MSFT", "NVDA", "AVGO", "CRM", "ORCL", "AMD", "ADBE"],
            ),
            Instrument::new(
                "XLF",
                "Financial Select Sector SPDR",
                "sector",
                &["BRK.B", "JPM", "V", "MA", "BAC", "WFC", "GS", "SPGI"],
            ),
            Instrument::new(
                "XLV",
                "Health Care Select Sector SPDR",
                "sector",
                &["LLY", "UNH", "JNJ", "ABBV", "MRK", "TMO", "ABT", "ISRG"],
            ),
            Instrument::new(
                "XLE",
                "Energy Select Sector SPDR",
                "sector",
                &["XOM", "CVX", "COP", "EOG", "SLB", "MPC", "PSX", "WMB"],
            ),
            Instrument::new(
                "XLY",
                "Consumer Discretionary Select Sector SPDR",
                "sector",
                &["AMZN", "TSLA", "HD", "MCD", "LOW", "BKNG", "TJX", "NKE"],
            ),
            Instrument::new(
                "XLP",
                "Consumer Staples Select Sector SPDR",
                "sector",
                &["PG", "COST", "WMT", "KO", "PEP", "PM", "MDLZ", "CL"],
            ),
            Instrument::new(
                "XLI",
                "Industrial Select Sector SPDR",
                "sector",
                &["GE", "CAT", "RTX", "UNP", "HON", "ETN", "UBER", "BA"],
            ),
            Instrument::new(
                "XLB",
                "Materials Select Sector SPDR",
                "sector",
                &["LIN", "SHW", "APD", "ECL", "FCX", "NEM", "CTVA", "DOW"],
            ),
            Instrument::new(
                "XLU",
                "Utilities Select Sector SPDR",
                "sector",
                &["NEE", "SO", "DUK", "CEG", "SRE", "AEP", "D", "EXC"],
            ),
            Instrument::new(
                "XLRE",
                "Real Estate Select Sector SPDR",
                "sector",
                &["PLD", "AMT", "EQIX", "WELL", "SPG", "O", "PSA", "CCI"],
            ),
            Instrument::new(
                "XLC",
                "Communication Services Select Sector SPDR",
                "sector",
                &["META", "GOOGL", "GOOG", "NFLX", "TMUS", "DIS", "CMCSA", "VZ"],
            ),
        ];

        Self {
            benchmark: "SPY".to_string(),
            instruments,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::default_sectors()
    }
}
