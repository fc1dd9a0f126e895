use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::quote::PricePoint;
use crate::models::ticker::Market;

/// Trait abstraction for all market-data providers.
///
/// Each API (Polygon.io, Yahoo Finance) implements this trait. If an API
/// stops working or changes, only that one implementation is replaced —
/// the rest of the codebase is untouched.
///
/// All prices are returned in USD; no currency conversion happens anywhere.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which market classes this provider can serve.
    fn supported_markets(&self) -> Vec<Market>;

    /// Get the current (latest) price of a symbol.
    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError>;

    /// Get the closing price of a symbol on a specific date.
    async fn get_historical_price(&self, symbol: &str, date: NaiveDate) -> Result<f64, CoreError>;

    /// Get daily closing prices for a date range (for history charts).
    /// Returns a Vec of PricePoints sorted by date.
    async fn get_price_range(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError>;
}
