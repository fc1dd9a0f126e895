pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::NaiveDate;
use models::{
    quote::{PricePoint, QuoteCache},
    report::ValuationReport,
    settings::Settings,
    ticker::{Market, Ticker},
};
use providers::registry::ProviderRegistry;
use services::{quote_service::QuoteService, valuation_service::ValuationService};

use errors::CoreError;

/// Maximum price-history range in days (10 years).
const MAX_HISTORY_RANGE_DAYS: i64 = 3650;

/// Maximum ticker symbol length, prefix included (e.g., "X:BTCUSD").
const MAX_SYMBOL_LEN: usize = 12;

/// Main entry point for the Profit Tracker core library.
///
/// Holds the watchlist of selectable tickers, the quote cache, and the
/// services needed to turn a `(symbol, start date, end date)` selection
/// into profit and annualized return.
#[must_use]
pub struct ProfitTracker {
    settings: Settings,
    watchlist: Vec<Ticker>,
    quote_cache: QuoteCache,
    quote_service: QuoteService,
    valuation_service: ValuationService,
}

impl std::fmt::Debug for ProfitTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfitTracker")
            .field("tickers", &self.watchlist.len())
            .field("cached_quotes", &self.quote_cache.total_entries())
            .finish()
    }
}

impl ProfitTracker {
    /// Create a tracker with an empty watchlist and default settings.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Create a tracker with explicit settings (API keys).
    pub fn with_settings(settings: Settings) -> Self {
        let registry = ProviderRegistry::new_with_defaults(&settings.api_keys);
        Self {
            settings,
            watchlist: Vec::new(),
            quote_cache: QuoteCache::new(),
            quote_service: QuoteService::new(registry),
            valuation_service: ValuationService::new(),
        }
    }

    /// Create a tracker configured from the process environment
    /// (`POLYGON_API_KEY`).
    pub fn from_env() -> Self {
        Self::with_settings(Settings::from_env())
    }

    // ── Watchlist ───────────────────────────────────────────────────

    /// Add a ticker to the watchlist. The symbol is validated and the
    /// watchlist is kept sorted by symbol.
    pub fn add_ticker(&mut self, ticker: Ticker) -> Result<(), CoreError> {
        Self::validate_symbol(&ticker.symbol)?;
        if self.watchlist.contains(&ticker) {
            return Err(CoreError::ValidationError(format!(
                "Ticker {} ({}) is already in the watchlist",
                ticker.symbol, ticker.market
            )));
        }
        Self::sorted_insert(&mut self.watchlist, ticker);
        Ok(())
    }

    /// Remove a ticker by symbol (case-insensitive). Returns the removed
    /// ticker.
    pub fn remove_ticker(&mut self, symbol: &str) -> Result<Ticker, CoreError> {
        let upper = symbol.to_uppercase();
        let idx = self
            .watchlist
            .iter()
            .position(|t| t.symbol == upper)
            .ok_or_else(|| CoreError::TickerNotFound(symbol.to_string()))?;
        Ok(self.watchlist.remove(idx))
    }

    /// All watchlist tickers, sorted by symbol.
    #[must_use]
    pub fn get_tickers(&self) -> &[Ticker] {
        &self.watchlist
    }

    /// Look up a watchlist ticker by symbol (case-insensitive).
    #[must_use]
    pub fn find_ticker(&self, symbol: &str) -> Option<&Ticker> {
        let upper = symbol.to_uppercase();
        self.watchlist.iter().find(|t| t.symbol == upper)
    }

    /// Number of tickers in the watchlist.
    #[must_use]
    pub fn ticker_count(&self) -> usize {
        self.watchlist.len()
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Valuate a single watchlist ticker over `[start, end]`: profit is
    /// its price delta, annualized return its CAGR. Prices come from the
    /// cache when available, otherwise from the API providers.
    pub async fn valuation(
        &mut self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ValuationReport, CoreError> {
        let ticker = self
            .find_ticker(symbol)
            .cloned()
            .ok_or_else(|| CoreError::TickerNotFound(symbol.to_string()))?;

        self.valuation_service
            .valuate(
                &self.quote_service,
                &mut self.quote_cache,
                std::slice::from_ref(&ticker),
                start,
                end,
            )
            .await
    }

    /// Valuate several watchlist tickers at once. Profit is summed across
    /// all of them; the annualized return is computed from the FIRST
    /// symbol in the slice (the reference instrument).
    pub async fn portfolio_valuation(
        &mut self,
        symbols: &[&str],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ValuationReport, CoreError> {
        let mut tickers = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let ticker = self
                .find_ticker(symbol)
                .cloned()
                .ok_or_else(|| CoreError::TickerNotFound((*symbol).to_string()))?;
            tickers.push(ticker);
        }

        self.valuation_service
            .valuate(&self.quote_service, &mut self.quote_cache, &tickers, start, end)
            .await
    }

    // ── Price history ───────────────────────────────────────────────

    /// Daily closing prices of a watchlist ticker over `[from, to]`, for
    /// chart rendering. The range is capped at 10 years.
    pub async fn price_history(
        &mut self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        if from > to {
            return Err(CoreError::ValidationError(format!(
                "'from' date ({from}) must not be after 'to' date ({to})"
            )));
        }
        let range_days = (to - from).num_days();
        if range_days > MAX_HISTORY_RANGE_DAYS {
            return Err(CoreError::ValidationError(format!(
                "History range of {range_days} days exceeds maximum of {MAX_HISTORY_RANGE_DAYS} days (10 years)"
            )));
        }

        let ticker = self
            .find_ticker(symbol)
            .cloned()
            .ok_or_else(|| CoreError::TickerNotFound(symbol.to_string()))?;

        self.quote_service
            .get_price_range(&mut self.quote_cache, &ticker.symbol, from, to, &ticker.market)
            .await
    }

    /// Fetch today's price for a watchlist ticker, refreshing the cache.
    pub async fn refresh_latest(&mut self, symbol: &str) -> Result<f64, CoreError> {
        let ticker = self
            .find_ticker(symbol)
            .cloned()
            .ok_or_else(|| CoreError::TickerNotFound(symbol.to_string()))?;

        let today = chrono::Utc::now().date_naive();
        self.quote_service
            .get_price(&mut self.quote_cache, &ticker.symbol, today, &ticker.market)
            .await
    }

    // ── Cache Management ────────────────────────────────────────────

    /// Get the total number of cached price points.
    #[must_use]
    pub fn cache_total_entries(&self) -> usize {
        self.quote_cache.total_entries()
    }

    /// Get the number of distinct symbols cached.
    #[must_use]
    pub fn cache_symbol_count(&self) -> usize {
        self.quote_cache.symbol_count()
    }

    /// Remove all cached price points older than `before` date.
    /// Returns the number of entries removed.
    pub fn cache_prune_before(&mut self, before: NaiveDate) -> usize {
        self.quote_cache.prune_before(before)
    }

    /// Clear all cached quote data.
    pub fn cache_clear(&mut self) {
        self.quote_cache.clear();
    }

    /// Get a specific cached price.
    #[must_use]
    pub fn get_cached_price(&self, symbol: &str, date: NaiveDate) -> Option<f64> {
        self.quote_cache.get_price(symbol, date)
    }

    /// Manually insert a price into the cache (offline use, tests, or
    /// historical import).
    pub fn set_cached_price(&mut self, symbol: &str, date: NaiveDate, price: f64) {
        self.quote_cache.set_price(symbol, date, price);
    }

    /// Get the date when a symbol's current price was last refreshed.
    #[must_use]
    pub fn get_last_refreshed(&self, symbol: &str) -> Option<NaiveDate> {
        self.quote_cache
            .last_updated
            .get(&symbol.to_uppercase())
            .copied()
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Get current settings.
    #[must_use]
    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }

    /// Set an API key for a provider (e.g., "polygon").
    /// Rebuilds the provider registry so the new key takes effect immediately.
    pub fn set_api_key(&mut self, provider: String, key: String) {
        self.settings.api_keys.insert(provider, key);
        self.rebuild_quote_service();
    }

    /// Remove an API key for a provider.
    /// Rebuilds the provider registry so the removal takes effect immediately.
    pub fn remove_api_key(&mut self, provider: &str) -> bool {
        let removed = self.settings.api_keys.remove(provider).is_some();
        if removed {
            self.rebuild_quote_service();
        }
        removed
    }

    // ── Provider Availability ───────────────────────────────────────

    /// Check if at least one provider is available for a given market.
    #[must_use]
    pub fn is_provider_available(&self, market: &Market) -> bool {
        self.quote_service.has_provider_for(market)
    }

    /// Get the names of available providers for a given market.
    #[must_use]
    pub fn get_provider_names(&self, market: &Market) -> Vec<String> {
        self.quote_service.get_provider_names(market)
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export the watchlist as a JSON string.
    pub fn export_watchlist_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.watchlist)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize watchlist: {e}")))
    }

    /// Import tickers from a JSON string. All tickers are validated first;
    /// if any is invalid or already present, none are added
    /// (all-or-nothing). Returns the number of tickers imported.
    pub fn import_watchlist_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let tickers: Vec<Ticker> = serde_json::from_str(json)?;
        let count = tickers.len();

        let mut merged = self.watchlist.clone();
        for ticker in tickers {
            Self::validate_symbol(&ticker.symbol)?;
            if merged.contains(&ticker) {
                return Err(CoreError::ValidationError(format!(
                    "Ticker {} ({}) is already in the watchlist",
                    ticker.symbol, ticker.market
                )));
            }
            Self::sorted_insert(&mut merged, ticker);
        }

        self.watchlist = merged;
        Ok(count)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn rebuild_quote_service(&mut self) {
        let registry = ProviderRegistry::new_with_defaults(&self.settings.api_keys);
        self.quote_service = QuoteService::new(registry);
    }

    /// A valid symbol is non-empty, at most [`MAX_SYMBOL_LEN`] characters,
    /// and uses only ASCII alphanumerics plus `.`, `-`, and the `:` of
    /// market prefixes. Symbols arrive uppercased from `Ticker::new`.
    fn validate_symbol(symbol: &str) -> Result<(), CoreError> {
        if symbol.is_empty() {
            return Err(CoreError::ValidationError(
                "Ticker symbol must not be empty".into(),
            ));
        }
        if symbol.len() > MAX_SYMBOL_LEN {
            return Err(CoreError::ValidationError(format!(
                "Ticker symbol '{symbol}' exceeds {MAX_SYMBOL_LEN} characters"
            )));
        }
        if !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == ':')
        {
            return Err(CoreError::ValidationError(format!(
                "Ticker symbol '{symbol}' contains invalid characters"
            )));
        }
        Ok(())
    }

    /// Binary insert into a symbol-sorted watchlist in O(log n).
    fn sorted_insert(watchlist: &mut Vec<Ticker>, ticker: Ticker) {
        let pos = watchlist
            .binary_search_by(|t| t.symbol.as_str().cmp(ticker.symbol.as_str()))
            .unwrap_or_else(|pos| pos);
        watchlist.insert(pos, ticker);
    }
}

impl Default for ProfitTracker {
    fn default() -> Self {
        Self::new()
    }
}
