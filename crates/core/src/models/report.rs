use serde::{Deserialize, Serialize};

/// The quote currency every price in this library is expressed in.
/// There is no currency conversion anywhere.
pub const QUOTE_CURRENCY: &str = "USD";

/// Result of one valuation cycle over a date range.
///
/// The core produces these — the frontend just renders them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationReport {
    /// Start of the valuation range
    pub start_date: chrono::NaiveDate,

    /// End of the valuation range
    pub end_date: chrono::NaiveDate,

    /// Currency all prices are quoted in (always [`QUOTE_CURRENCY`])
    pub currency: String,

    /// Sum across instruments of (end price − start price), unweighted
    pub profit: f64,

    /// Compound annual growth rate of the reference instrument over the
    /// range, as a fraction (0.1 = 10%). Zero for a degenerate range.
    pub annualized_return: f64,

    /// Symbol the annualized return was computed from — the first
    /// instrument requested. `None` only for an empty request, which the
    /// valuation service rejects before building a report.
    pub reference_symbol: Option<String>,

    /// Per-instrument breakdown, in request order
    pub instruments: Vec<InstrumentBreakdown>,
}

/// Boundary prices and delta for a single instrument in a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentBreakdown {
    /// Ticker symbol
    pub symbol: String,

    /// Price on the range start date
    pub start_price: f64,

    /// Price on the range end date
    pub end_price: f64,

    /// end_price − start_price (this instrument's profit contribution)
    pub delta: f64,
}
