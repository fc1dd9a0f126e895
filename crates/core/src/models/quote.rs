use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single quote data point (date → price, in the quote currency).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// In-memory cache of fetched quotes, one sorted series per symbol.
///
/// - Historical prices (date < today) are fetched ONCE and never re-fetched.
/// - Today's price can be refreshed, at most once per day unless forced.
///
/// All quotes are in USD (the single quote currency of this library), so
/// the cache is keyed by symbol alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteCache {
    /// symbol → PricePoints sorted by date
    pub entries: HashMap<String, Vec<PricePoint>>,

    /// Tracks when we last refreshed "today's" price for each symbol.
    /// Used to avoid redundant API calls within the same day.
    pub last_updated: HashMap<String, NaiveDate>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached price for a specific (symbol, date).
    /// Returns None if not cached. Uses binary search (O(log n)).
    pub fn get_price(&self, symbol: &str, date: NaiveDate) -> Option<f64> {
        let entries = self.entries.get(&symbol.to_uppercase())?;
        entries
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| entries[idx].price)
    }

    /// Insert or update a price point, keeping the series date-sorted
    /// via binary search (O(log n) insertion).
    pub fn set_price(&mut self, symbol: &str, date: NaiveDate, price: f64) {
        let entries = self.entries.entry(symbol.to_uppercase()).or_default();

        match entries.binary_search_by_key(&date, |p| p.date) {
            Ok(idx) => {
                entries[idx].price = price;
            }
            Err(idx) => {
                entries.insert(idx, PricePoint { date, price });
            }
        }
    }

    /// Insert multiple price points at once (e.g., from a range fetch).
    pub fn set_prices(&mut self, symbol: &str, points: &[PricePoint]) {
        for point in points {
            self.set_price(symbol, point.date, point.price);
        }
    }

    /// Check if today's price was already fetched today.
    pub fn is_today_fresh(&self, symbol: &str, today: NaiveDate) -> bool {
        self.last_updated
            .get(&symbol.to_uppercase())
            .is_some_and(|&d| d == today)
    }

    /// Mark that we've refreshed the current price for this symbol today.
    pub fn mark_updated_today(&mut self, symbol: &str, today: NaiveDate) {
        self.last_updated.insert(symbol.to_uppercase(), today);
    }

    /// Total number of cached price points across all symbols.
    pub fn total_entries(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }

    /// Number of distinct symbols cached.
    pub fn symbol_count(&self) -> usize {
        self.entries.len()
    }

    /// Remove all cached price points older than `before` date.
    /// Returns the number of entries removed.
    pub fn prune_before(&mut self, before: NaiveDate) -> usize {
        let mut removed = 0;
        for entries in self.entries.values_mut() {
            let old_len = entries.len();
            let split = entries
                .binary_search_by_key(&before, |p| p.date)
                .unwrap_or_else(|pos| pos);
            if split > 0 {
                entries.drain(..split);
                removed += old_len - entries.len();
            }
        }
        self.entries.retain(|_, v| !v.is_empty());
        // Drop freshness markers for pruned symbols or stale dates
        self.last_updated
            .retain(|symbol, updated| self.entries.contains_key(symbol) && *updated >= before);
        removed
    }

    /// Clear all cached data.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_updated.clear();
    }

    /// All cached price points for a symbol within `[from, to]`, via
    /// binary search on the range boundaries.
    pub fn get_price_range(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> Vec<PricePoint> {
        self.entries
            .get(&symbol.to_uppercase())
            .map(|entries| {
                let start = entries
                    .binary_search_by_key(&from, |p| p.date)
                    .unwrap_or_else(|pos| pos);
                let end = entries
                    .binary_search_by_key(&to, |p| p.date)
                    .map(|pos| pos + 1) // include the exact match
                    .unwrap_or_else(|pos| pos);
                entries[start..end].to_vec()
            })
            .unwrap_or_default()
    }
}
