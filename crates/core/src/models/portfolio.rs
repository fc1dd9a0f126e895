use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::instrument::Instrument;

/// Average calendar year length in days, used to annualize returns.
/// A fixed convention — not calendar-aware, no leap-year exactness.
const DAYS_PER_YEAR: f64 = 365.25;

/// An ordered collection of instruments and the two aggregate metrics
/// computed over a date range.
///
/// Constructed fresh on each recomputation from the current selection,
/// used to produce its two outputs, then discarded. Both operations are
/// pure functions of the stored state: no I/O, no errors, no panics —
/// missing data and degenerate intervals degrade to `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    instruments: Vec<Instrument>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instruments(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    /// Append an instrument. Insertion order is preserved and determines
    /// which instrument anchors `annualized_return`.
    pub fn add_instrument(&mut self, instrument: Instrument) {
        self.instruments.push(instrument);
    }

    #[must_use]
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// Sum across all instruments of `price(end) − price(start)`.
    ///
    /// Unweighted — each instrument contributes its raw per-unit price
    /// delta, no share counts. An empty portfolio yields `0.0`. A date
    /// with no stored price contributes as price `0.0` (see
    /// [`Instrument::price`]).
    #[must_use]
    pub fn profit(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        self.instruments
            .iter()
            .map(|i| i.price(end) - i.price(start))
            .sum()
    }

    /// Compound annual growth rate over the range, computed from the
    /// **first instrument only** — later instruments never influence the
    /// result. A single-reference-asset convention: the return shown is
    /// the selected symbol's, even when more instruments are present.
    ///
    /// Elapsed time is measured in 365.25-day years. Returns `0.0` for a
    /// degenerate interval (zero or negative elapsed time) or a
    /// non-positive start price, rather than erroring.
    #[must_use]
    pub fn annualized_return(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        let Some(first) = self.instruments.first() else {
            return 0.0;
        };

        let years = (end - start).num_days() as f64 / DAYS_PER_YEAR;
        let start_price = first.price(start);
        let end_price = first.price(end);

        if years > 0.0 && start_price > 0.0 {
            (end_price / start_price).powf(1.0 / years) - 1.0
        } else {
            0.0
        }
    }
}
