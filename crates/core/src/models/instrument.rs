use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single tradable symbol with a sparse date → price lookup.
///
/// Built once per fetch cycle with exactly the dates the valuation needs
/// (typically the two range boundaries). Never mutated afterwards — when
/// fresh data arrives, a new `Instrument` supersedes the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Ticker symbol, uppercased (e.g., "AAPL")
    symbol: String,

    /// Observed prices keyed by calendar date. Sparse — keys need not be
    /// contiguous or ordered.
    prices: HashMap<NaiveDate, f64>,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, prices: HashMap<NaiveDate, f64>) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            prices,
        }
    }

    /// Build an instrument holding exactly the two boundary prices of a
    /// valuation range — the shape the fetch cycle produces.
    pub fn from_boundaries(
        symbol: impl Into<String>,
        start_date: NaiveDate,
        start_price: f64,
        end_date: NaiveDate,
        end_price: f64,
    ) -> Self {
        let mut prices = HashMap::new();
        prices.insert(start_date, start_price);
        prices.insert(end_date, end_price);
        Self::new(symbol, prices)
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Price on `date`, or `0.0` when no price is stored for that exact date.
    ///
    /// An absent date is indistinguishable from a zero price — the lookup
    /// has no notion of "unknown". Callers that must tell the two apart
    /// check `has_price` before relying on the result. The fetch layer
    /// fails loudly on missing data, so zero-defaulting only surfaces when
    /// an instrument is constructed with incomplete boundaries on purpose.
    #[must_use]
    pub fn price(&self, date: NaiveDate) -> f64 {
        self.prices.get(&date).copied().unwrap_or(0.0)
    }

    /// Whether a price is stored for this exact date.
    #[must_use]
    pub fn has_price(&self, date: NaiveDate) -> bool {
        self.prices.contains_key(&date)
    }

    /// Number of stored price points.
    #[must_use]
    pub fn price_count(&self) -> usize {
        self.prices.len()
    }
}
