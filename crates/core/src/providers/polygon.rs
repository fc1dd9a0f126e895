use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::MarketDataProvider;
use crate::errors::CoreError;
use crate::models::quote::PricePoint;
use crate::models::ticker::Market;

const BASE_URL: &str = "https://api.polygon.io";

/// Polygon.io provider for stock, crypto, and forex prices.
///
/// - **Requires**: API key (set via settings as "polygon").
/// - **Free tier**: 5 requests/minute — cache aggressively.
/// - **Coverage**: US equities plus crypto (`X:BTCUSD`) and forex
///   (`C:EURUSD`) tickers; the prefix is part of the symbol.
/// - **Endpoints**: daily open/close for a single historical date,
///   previous-close aggregate for the current price, day aggregates
///   for ranges.
///
/// Prices are in USD.
pub struct PolygonProvider {
    client: Client,
    api_key: String,
}

impl PolygonProvider {
    pub fn new(api_key: String) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
        }
    }
}

// ── Polygon API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct DailyOpenCloseResponse {
    status: Option<String>,
    close: Option<f64>,
}

#[derive(Deserialize)]
struct AggsResponse {
    results: Option<Vec<AggBar>>,
}

#[derive(Deserialize)]
struct AggBar {
    /// Window start, unix timestamp in milliseconds
    #[serde(rename = "t")]
    timestamp: i64,
    /// Closing price of the window
    #[serde(rename = "c")]
    close: f64,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MarketDataProvider for PolygonProvider {
    fn name(&self) -> &str {
        "Polygon"
    }

    fn supported_markets(&self) -> Vec<Market> {
        vec![Market::Stocks, Market::Crypto, Market::Forex]
    }

    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError> {
        // Previous-close aggregate — the latest finished trading day.
        let ticker = symbol.to_uppercase();
        let url = format!("{BASE_URL}/v2/aggs/ticker/{ticker}/prev");

        let resp: AggsResponse = self
            .client
            .get(&url)
            .query(&[("adjusted", "true"), ("apiKey", self.api_key.as_str())])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Polygon".into(),
                message: format!("Failed to parse previous close for {symbol}: {e}"),
            })?;

        resp.results
            .and_then(|bars| bars.first().map(|b| b.close))
            .ok_or_else(|| CoreError::Api {
                provider: "Polygon".into(),
                message: format!("No previous close for {symbol}. Rate limit may be exceeded."),
            })
    }

    async fn get_historical_price(&self, symbol: &str, date: NaiveDate) -> Result<f64, CoreError> {
        let ticker = symbol.to_uppercase();
        let date_str = date.format("%Y-%m-%d").to_string();
        let url = format!("{BASE_URL}/v1/open-close/{ticker}/{date_str}");

        let resp: DailyOpenCloseResponse = self
            .client
            .get(&url)
            .query(&[("adjusted", "true"), ("apiKey", self.api_key.as_str())])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Polygon".into(),
                message: format!("Failed to parse daily open/close for {symbol} on {date}: {e}"),
            })?;

        // Non-trading days and unknown tickers come back without a close
        // (status NOT_FOUND), not as an HTTP error.
        match resp.close {
            Some(close) => Ok(close),
            None => match resp.status.as_deref() {
                Some("NOT_FOUND") | None => Err(CoreError::PriceNotAvailable {
                    symbol: symbol.to_string(),
                    date: date.to_string(),
                }),
                Some(status) => Err(CoreError::Api {
                    provider: "Polygon".into(),
                    message: format!("Unexpected status '{status}' for {symbol} on {date}"),
                }),
            },
        }
    }

    async fn get_price_range(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let ticker = symbol.to_uppercase();
        let from_str = from.format("%Y-%m-%d").to_string();
        let to_str = to.format("%Y-%m-%d").to_string();
        let url = format!("{BASE_URL}/v2/aggs/ticker/{ticker}/range/1/day/{from_str}/{to_str}");

        let resp: AggsResponse = self
            .client
            .get(&url)
            .query(&[
                ("adjusted", "true"),
                ("sort", "asc"),
                ("limit", "50000"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Polygon".into(),
                message: format!("Failed to parse aggregates for {symbol}: {e}"),
            })?;

        let points: Vec<PricePoint> = resp
            .results
            .unwrap_or_default()
            .iter()
            .filter_map(|bar| {
                let dt = chrono::DateTime::from_timestamp_millis(bar.timestamp)?;
                let date = dt.date_naive();
                if date >= from && date <= to {
                    Some(PricePoint {
                        date,
                        price: bar.close,
                    })
                } else {
                    None
                }
            })
            .collect();

        Ok(points)
    }
}
