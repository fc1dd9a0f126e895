use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::quote::{PricePoint, QuoteCache};
use crate::models::ticker::Market;
use crate::providers::registry::ProviderRegistry;

/// Fetches quotes from API providers with cache-first semantics.
///
/// Cache strategy:
/// - **Historical dates (< today)**: fetch once, cache forever. Past prices
///   don't change.
/// - **Today's date**: fetch once per day, refresh on the next day.
///
/// **Note on precision**: prices are `f64` (~15-17 significant decimal
/// digits) — sufficient here, where each valuation performs two arithmetic
/// operations per instrument.
pub struct QuoteService {
    registry: ProviderRegistry,
}

impl QuoteService {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Check if at least one provider is available for a given market.
    pub fn has_provider_for(&self, market: &Market) -> bool {
        self.registry.get_provider_for(market).is_some()
    }

    /// Get the names of all providers available for a given market.
    pub fn get_provider_names(&self, market: &Market) -> Vec<String> {
        self.registry
            .get_providers_for(market)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Get the price of a symbol on a specific date.
    ///
    /// 1. Check cache → return if found (historical dates always trust cache).
    /// 2. If not cached: fetch from API → store in cache → return.
    /// 3. For today's date: re-fetch if not already fetched today.
    pub async fn get_price(
        &self,
        cache: &mut QuoteCache,
        symbol: &str,
        date: NaiveDate,
        market: &Market,
    ) -> Result<f64, CoreError> {
        let today = chrono::Utc::now().date_naive();

        if let Some(price) = cache.get_price(symbol, date) {
            if date < today {
                return Ok(price);
            }
            if cache.is_today_fresh(symbol, today) {
                return Ok(price);
            }
        }

        // Cache miss — fetch from API
        let price = self.fetch_price(symbol, date, market).await?;

        cache.set_price(symbol, date, price);
        if date == today {
            cache.mark_updated_today(symbol, today);
        }

        Ok(price)
    }

    /// Fetch a range of daily prices (for history charts).
    /// Reuses the cache when it already spans the requested range.
    pub async fn get_price_range(
        &self,
        cache: &mut QuoteCache,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
        market: &Market,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let cached = cache.get_price_range(symbol, from, to);

        // Trust the cache if it covers both range boundaries. Boundary dates
        // are compared with a 3-day tolerance — weekends and holidays leave
        // gaps at the edges, so exact-date coverage is too strict a test.
        if cached.len() >= 2 {
            let first = cached.first().unwrap().date;
            let last = cached.last().unwrap().date;
            if (first - from).num_days().abs() <= 3 && (to - last).num_days().abs() <= 3 {
                return Ok(cached);
            }
        }

        // Fetch the full range from API (with fallback)
        let providers = self.registry.get_providers_for(market);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(market.to_string()));
        }

        let mut last_error = None;
        for provider in &providers {
            match provider.get_price_range(symbol, from, to).await {
                Ok(points) => {
                    cache.set_prices(symbol, &points);
                    return Ok(points);
                }
                Err(e) => {
                    last_error = Some(e);
                    // Try next provider
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(market.to_string())))
    }

    /// Internal: fetch a single price with automatic provider fallback.
    ///
    /// Tries providers in registration order. If the primary fails (API
    /// down, rate limited, etc.), the next provider is tried. Returned
    /// prices must be finite and non-negative to be accepted.
    async fn fetch_price(
        &self,
        symbol: &str,
        date: NaiveDate,
        market: &Market,
    ) -> Result<f64, CoreError> {
        let providers = self.registry.get_providers_for(market);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(market.to_string()));
        }

        let today = chrono::Utc::now().date_naive();
        let mut last_error = None;

        for provider in &providers {
            let result = if date >= today {
                provider.get_current_price(symbol).await
            } else {
                provider.get_historical_price(symbol, date).await
            };

            match result {
                Ok(price) => {
                    if !price.is_finite() || price < 0.0 {
                        last_error = Some(CoreError::Api {
                            provider: provider.name().to_string(),
                            message: format!(
                                "Invalid price returned for {symbol}: {price} (must be finite and non-negative)"
                            ),
                        });
                        continue;
                    }
                    return Ok(price);
                }
                Err(e) => {
                    last_error = Some(e);
                    // Try next provider
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(market.to_string())))
    }
}
