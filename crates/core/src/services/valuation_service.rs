use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::instrument::Instrument;
use crate::models::portfolio::Portfolio;
use crate::models::quote::QuoteCache;
use crate::models::report::{InstrumentBreakdown, ValuationReport, QUOTE_CURRENCY};
use crate::models::ticker::Ticker;
use crate::services::quote_service::QuoteService;

/// Runs one valuation cycle: resolve each ticker's two boundary prices,
/// assemble instruments into a portfolio, and compute the two metrics.
///
/// Fetch failures are loud here — a missing quote becomes
/// `PriceNotAvailable` (or an `Api`/`Network` error), never a silent zero.
/// Only the calculator underneath treats an absent date as price zero, and
/// this service always hands it fully-populated instruments.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Valuate `tickers` over `[start, end]`, first ticker as the reference
    /// instrument for the annualized return.
    ///
    /// `start > end` is rejected before any fetching; `start == end` is a
    /// valid range with a zero annualized return.
    pub async fn valuate(
        &self,
        quote_service: &QuoteService,
        cache: &mut QuoteCache,
        tickers: &[Ticker],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ValuationReport, CoreError> {
        if tickers.is_empty() {
            return Err(CoreError::ValidationError(
                "At least one ticker is required for a valuation".into(),
            ));
        }
        if start > end {
            return Err(CoreError::ValidationError(format!(
                "Start date ({start}) must not be after end date ({end})"
            )));
        }

        let mut instruments = Vec::with_capacity(tickers.len());
        let mut breakdowns = Vec::with_capacity(tickers.len());

        for ticker in tickers {
            let start_price = quote_service
                .get_price(cache, &ticker.symbol, start, &ticker.market)
                .await?;
            let end_price = quote_service
                .get_price(cache, &ticker.symbol, end, &ticker.market)
                .await?;

            instruments.push(Instrument::from_boundaries(
                &ticker.symbol,
                start,
                start_price,
                end,
                end_price,
            ));
            breakdowns.push(InstrumentBreakdown {
                symbol: ticker.symbol.clone(),
                start_price,
                end_price,
                delta: end_price - start_price,
            });
        }

        let portfolio = Portfolio::with_instruments(instruments);

        Ok(ValuationReport {
            start_date: start,
            end_date: end,
            currency: QUOTE_CURRENCY.to_string(),
            profit: portfolio.profit(start, end),
            annualized_return: portfolio.annualized_return(start, end),
            reference_symbol: tickers.first().map(|t| t.symbol.clone()),
            instruments: breakdowns,
        })
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
