use std::collections::HashMap;

use crate::models::ticker::Market;

use super::polygon::PolygonProvider;
use super::traits::MarketDataProvider;
#[cfg(not(target_arch = "wasm32"))]
use super::yahoo_finance::YahooFinanceProvider;

/// Registry of all available market-data providers.
///
/// Routes requests to the correct provider based on `Market`. Registration
/// order is the fallback order: if the first supporting provider fails,
/// the next one is tried.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn MarketDataProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with all default providers pre-configured.
    pub fn new_with_defaults(api_keys: &HashMap<String, String>) -> Self {
        let mut registry = Self::new();

        // Polygon — stocks/crypto/forex, requires API key (primary)
        if let Some(key) = api_keys.get("polygon") {
            registry.register(Box::new(PolygonProvider::new(key.clone())));
        }

        // Yahoo Finance — stocks, no API key needed (fallback)
        // Not available on WASM (uses native reqwest/tokio connectors)
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Ok(yahoo) = YahooFinanceProvider::new() {
                registry.register(Box::new(yahoo));
            }
        }

        registry
    }

    /// Register a new provider.
    pub fn register(&mut self, provider: Box<dyn MarketDataProvider>) {
        self.providers.push(provider);
    }

    /// Find the first provider that supports the given market.
    pub fn get_provider_for(&self, market: &Market) -> Option<&dyn MarketDataProvider> {
        self.providers
            .iter()
            .find(|p| p.supported_markets().contains(market))
            .map(|p| p.as_ref())
    }

    /// Return ALL providers that support the given market, in registration
    /// order. Used for fallback: if the first provider fails, try the next.
    pub fn get_providers_for(&self, market: &Market) -> Vec<&dyn MarketDataProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_markets().contains(market))
            .map(|p| p.as_ref())
            .collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
