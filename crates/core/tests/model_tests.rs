// ═══════════════════════════════════════════════════════════════════
// Model Tests — Instrument, Portfolio, QuoteCache, Ticker, Report,
// Settings
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use profit_tracker_core::models::instrument::Instrument;
use profit_tracker_core::models::portfolio::Portfolio;
use profit_tracker_core::models::quote::{PricePoint, QuoteCache};
use profit_tracker_core::models::report::{InstrumentBreakdown, ValuationReport, QUOTE_CURRENCY};
use profit_tracker_core::models::settings::{Settings, POLYGON_API_KEY_ENV};
use profit_tracker_core::models::ticker::{Market, Ticker};
use std::collections::{HashMap, HashSet};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
//  Market
// ═══════════════════════════════════════════════════════════════════

mod market {
    use super::*;

    #[test]
    fn display_stocks() {
        assert_eq!(Market::Stocks.to_string(), "Stocks");
    }

    #[test]
    fn display_crypto() {
        assert_eq!(Market::Crypto.to_string(), "Crypto");
    }

    #[test]
    fn display_forex() {
        assert_eq!(Market::Forex.to_string(), "Forex");
    }

    #[test]
    fn equality() {
        assert_eq!(Market::Stocks, Market::Stocks);
        assert_ne!(Market::Stocks, Market::Crypto);
        assert_ne!(Market::Crypto, Market::Forex);
    }

    #[test]
    fn serde_roundtrip_json() {
        for m in [Market::Stocks, Market::Crypto, Market::Forex] {
            let json = serde_json::to_string(&m).unwrap();
            let back: Market = serde_json::from_str(&json).unwrap();
            assert_eq!(m, back);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Ticker
// ═══════════════════════════════════════════════════════════════════

mod ticker {
    use super::*;

    #[test]
    fn new_uppercases_symbol() {
        let t = Ticker::new("aapl", "Apple Inc.", Market::Stocks);
        assert_eq!(t.symbol, "AAPL");
    }

    #[test]
    fn new_preserves_name_case() {
        let t = Ticker::new("msft", "Microsoft Corporation", Market::Stocks);
        assert_eq!(t.name, "Microsoft Corporation");
    }

    #[test]
    fn new_uppercases_prefixed_symbol() {
        let t = Ticker::new("x:btcusd", "Bitcoin", Market::Crypto);
        assert_eq!(t.symbol, "X:BTCUSD");
    }

    #[test]
    fn stock_constructor() {
        let t = Ticker::stock("voo", "Vanguard S&P 500 ETF");
        assert_eq!(t.symbol, "VOO");
        assert_eq!(t.market, Market::Stocks);
    }

    #[test]
    fn crypto_constructor() {
        let t = Ticker::crypto("X:ETHUSD", "Ethereum");
        assert_eq!(t.market, Market::Crypto);
    }

    #[test]
    fn forex_constructor() {
        let t = Ticker::forex("C:EURUSD", "Euro / US Dollar");
        assert_eq!(t.market, Market::Forex);
    }

    #[test]
    fn equality_ignores_name() {
        let a = Ticker::stock("AAPL", "Apple");
        let b = Ticker::stock("AAPL", "Apple Inc.");
        assert_eq!(a, b);
    }

    #[test]
    fn equality_depends_on_market() {
        let a = Ticker::new("ABC", "Abc", Market::Stocks);
        let b = Ticker::new("ABC", "Abc", Market::Crypto);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_consistent_with_eq() {
        let mut set = HashSet::new();
        set.insert(Ticker::stock("AAPL", "Apple"));
        // Same symbol+market, different name — must collide
        assert!(!set.insert(Ticker::stock("AAPL", "Apple Inc.")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn serde_roundtrip_json() {
        let t = Ticker::stock("AAPL", "Apple Inc.");
        let json = serde_json::to_string(&t).unwrap();
        let back: Ticker = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
        assert_eq!(back.name, "Apple Inc.");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Instrument
// ═══════════════════════════════════════════════════════════════════

mod instrument {
    use super::*;

    fn aapl_two_points() -> Instrument {
        let mut prices = HashMap::new();
        prices.insert(d(2024, 1, 2), 185.0);
        prices.insert(d(2024, 6, 3), 194.0);
        Instrument::new("AAPL", prices)
    }

    #[test]
    fn price_returns_stored_value() {
        let i = aapl_two_points();
        assert_eq!(i.price(d(2024, 1, 2)), 185.0);
        assert_eq!(i.price(d(2024, 6, 3)), 194.0);
    }

    #[test]
    fn price_defaults_to_zero_for_absent_date() {
        let i = aapl_two_points();
        assert_eq!(i.price(d(2024, 3, 15)), 0.0);
    }

    #[test]
    fn price_defaults_to_zero_for_empty_instrument() {
        let i = Instrument::new("AAPL", HashMap::new());
        assert_eq!(i.price(d(2024, 1, 2)), 0.0);
    }

    #[test]
    fn symbol_is_uppercased() {
        let i = Instrument::new("aapl", HashMap::new());
        assert_eq!(i.symbol(), "AAPL");
    }

    #[test]
    fn has_price_distinguishes_absent_from_zero() {
        let mut prices = HashMap::new();
        prices.insert(d(2024, 1, 2), 0.0);
        let i = Instrument::new("AAPL", prices);
        assert!(i.has_price(d(2024, 1, 2)));
        assert!(!i.has_price(d(2024, 1, 3)));
        // ...even though price() reports 0.0 for both
        assert_eq!(i.price(d(2024, 1, 2)), i.price(d(2024, 1, 3)));
    }

    #[test]
    fn from_boundaries_holds_exactly_two_points() {
        let i = Instrument::from_boundaries("msft", d(2024, 1, 2), 370.0, d(2024, 6, 3), 410.0);
        assert_eq!(i.symbol(), "MSFT");
        assert_eq!(i.price_count(), 2);
        assert_eq!(i.price(d(2024, 1, 2)), 370.0);
        assert_eq!(i.price(d(2024, 6, 3)), 410.0);
    }

    #[test]
    fn from_boundaries_same_date_keeps_end_price() {
        let i = Instrument::from_boundaries("AAPL", d(2024, 1, 2), 185.0, d(2024, 1, 2), 186.0);
        assert_eq!(i.price_count(), 1);
        assert_eq!(i.price(d(2024, 1, 2)), 186.0);
    }

    #[test]
    fn serde_roundtrip_json() {
        let i = aapl_two_points();
        let json = serde_json::to_string(&i).unwrap();
        let back: Instrument = serde_json::from_str(&json).unwrap();
        assert_eq!(i, back);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Portfolio — profit
// ═══════════════════════════════════════════════════════════════════

mod portfolio_profit {
    use super::*;

    fn start() -> NaiveDate {
        d(2024, 1, 2)
    }

    fn end() -> NaiveDate {
        d(2024, 6, 3)
    }

    fn instrument(symbol: &str, start_price: f64, end_price: f64) -> Instrument {
        Instrument::from_boundaries(symbol, start(), start_price, end(), end_price)
    }

    #[test]
    fn empty_portfolio_yields_zero() {
        let p = Portfolio::new();
        assert_eq!(p.profit(start(), end()), 0.0);
    }

    #[test]
    fn single_instrument_delta() {
        let p = Portfolio::with_instruments(vec![instrument("AAPL", 100.0, 150.0)]);
        assert_eq!(p.profit(start(), end()), 50.0);
    }

    #[test]
    fn sums_across_instruments_including_losses() {
        let p = Portfolio::with_instruments(vec![
            instrument("AAPL", 100.0, 150.0),
            instrument("MSFT", 200.0, 180.0),
        ]);
        assert_eq!(p.profit(start(), end()), 30.0);
    }

    #[test]
    fn missing_boundary_counts_as_zero_price() {
        // Only the start price is present — the absent end date contributes
        // a zero price, so the "profit" is minus the start price.
        let mut prices = HashMap::new();
        prices.insert(start(), 100.0);
        let p = Portfolio::with_instruments(vec![Instrument::new("AAPL", prices)]);
        assert_eq!(p.profit(start(), end()), -100.0);
    }

    #[test]
    fn add_instrument_preserves_insertion_order() {
        let mut p = Portfolio::new();
        p.add_instrument(instrument("AAPL", 100.0, 150.0));
        p.add_instrument(instrument("MSFT", 200.0, 180.0));
        assert_eq!(p.len(), 2);
        assert_eq!(p.instruments()[0].symbol(), "AAPL");
        assert_eq!(p.instruments()[1].symbol(), "MSFT");
    }

    #[test]
    fn is_empty_and_len() {
        let mut p = Portfolio::new();
        assert!(p.is_empty());
        p.add_instrument(instrument("AAPL", 1.0, 2.0));
        assert!(!p.is_empty());
        assert_eq!(p.len(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Portfolio — annualized return
// ═══════════════════════════════════════════════════════════════════

mod portfolio_annualized_return {
    use super::*;

    #[test]
    fn empty_portfolio_yields_zero() {
        let p = Portfolio::new();
        assert_eq!(p.annualized_return(d(2022, 1, 3), d(2024, 1, 3)), 0.0);
    }

    #[test]
    fn two_year_growth_is_about_ten_percent() {
        // 121/100 over two calendar years: (1.21)^(1/2) − 1 = 0.1.
        // 731 elapsed days vs the 365.25-day convention puts the result a
        // hair under 10%.
        let start = d(2022, 1, 3);
        let end = d(2024, 1, 4);
        let p = Portfolio::with_instruments(vec![Instrument::from_boundaries(
            "AAPL", start, 100.0, end, 121.0,
        )]);
        let ret = p.annualized_return(start, end);
        assert!((ret - 0.1).abs() < 1e-3, "got {ret}");
    }

    #[test]
    fn exact_formula_for_one_year_convention() {
        // With elapsed days other than 365.25 the exponent is fractional;
        // check against the formula directly.
        let start = d(2023, 1, 2);
        let end = d(2024, 1, 2);
        let p = Portfolio::with_instruments(vec![Instrument::from_boundaries(
            "AAPL", start, 100.0, end, 110.0,
        )]);
        let years = 365.0 / 365.25;
        let expected = (110.0f64 / 100.0).powf(1.0 / years) - 1.0;
        let ret = p.annualized_return(start, end);
        assert!((ret - expected).abs() < 1e-12, "got {ret}, want {expected}");
    }

    #[test]
    fn same_day_range_yields_zero() {
        let day = d(2024, 1, 2);
        let p = Portfolio::with_instruments(vec![Instrument::from_boundaries(
            "AAPL", day, 100.0, day, 150.0,
        )]);
        assert_eq!(p.annualized_return(day, day), 0.0);
    }

    #[test]
    fn reversed_range_yields_zero() {
        let start = d(2024, 6, 3);
        let end = d(2024, 1, 2);
        let p = Portfolio::with_instruments(vec![Instrument::from_boundaries(
            "AAPL", start, 100.0, end, 150.0,
        )]);
        assert_eq!(p.annualized_return(start, end), 0.0);
    }

    #[test]
    fn zero_start_price_yields_zero() {
        let start = d(2022, 1, 3);
        let end = d(2024, 1, 3);
        let p = Portfolio::with_instruments(vec![Instrument::from_boundaries(
            "AAPL", start, 0.0, end, 150.0,
        )]);
        assert_eq!(p.annualized_return(start, end), 0.0);
    }

    #[test]
    fn ignores_every_instrument_after_the_first() {
        let start = d(2022, 1, 3);
        let end = d(2024, 1, 3);
        let a = Instrument::from_boundaries("AAPL", start, 100.0, end, 121.0);
        let b = Instrument::from_boundaries("MSFT", start, 50.0, end, 500.0);

        let alone = Portfolio::with_instruments(vec![a.clone()]);
        let with_b = Portfolio::with_instruments(vec![a, b]);
        assert_eq!(
            alone.annualized_return(start, end),
            with_b.annualized_return(start, end)
        );
    }

    #[test]
    fn first_instrument_order_matters() {
        let start = d(2022, 1, 3);
        let end = d(2024, 1, 3);
        let a = Instrument::from_boundaries("AAPL", start, 100.0, end, 121.0);
        let b = Instrument::from_boundaries("MSFT", start, 100.0, end, 400.0);

        let ab = Portfolio::with_instruments(vec![a.clone(), b.clone()]);
        let ba = Portfolio::with_instruments(vec![b, a]);
        assert!(ba.annualized_return(start, end) > ab.annualized_return(start, end));
    }

    #[test]
    fn missing_end_price_returns_minus_one() {
        // Absent end date → end price 0 → (0/start)^(1/years) − 1 = −1.
        // The zero-default never raises; it just produces this extreme.
        let start = d(2022, 1, 3);
        let end = d(2024, 1, 3);
        let mut prices = HashMap::new();
        prices.insert(start, 100.0);
        let p = Portfolio::with_instruments(vec![Instrument::new("AAPL", prices)]);
        assert_eq!(p.annualized_return(start, end), -1.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  QuoteCache
// ═══════════════════════════════════════════════════════════════════

mod quote_cache {
    use super::*;

    #[test]
    fn get_uncached_returns_none() {
        let cache = QuoteCache::new();
        assert_eq!(cache.get_price("AAPL", d(2024, 1, 2)), None);
    }

    #[test]
    fn set_then_get() {
        let mut cache = QuoteCache::new();
        cache.set_price("AAPL", d(2024, 1, 2), 185.0);
        assert_eq!(cache.get_price("AAPL", d(2024, 1, 2)), Some(185.0));
    }

    #[test]
    fn set_updates_existing_entry() {
        let mut cache = QuoteCache::new();
        cache.set_price("AAPL", d(2024, 1, 2), 185.0);
        cache.set_price("AAPL", d(2024, 1, 2), 186.5);
        assert_eq!(cache.get_price("AAPL", d(2024, 1, 2)), Some(186.5));
        assert_eq!(cache.total_entries(), 1);
    }

    #[test]
    fn symbol_lookup_is_case_insensitive() {
        let mut cache = QuoteCache::new();
        cache.set_price("aapl", d(2024, 1, 2), 185.0);
        assert_eq!(cache.get_price("AAPL", d(2024, 1, 2)), Some(185.0));
        assert_eq!(cache.symbol_count(), 1);
    }

    #[test]
    fn out_of_order_inserts_stay_date_sorted() {
        let mut cache = QuoteCache::new();
        cache.set_price("AAPL", d(2024, 1, 5), 3.0);
        cache.set_price("AAPL", d(2024, 1, 1), 1.0);
        cache.set_price("AAPL", d(2024, 1, 3), 2.0);

        let range = cache.get_price_range("AAPL", d(2024, 1, 1), d(2024, 1, 5));
        let dates: Vec<NaiveDate> = range.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 3), d(2024, 1, 5)]);
    }

    #[test]
    fn set_prices_bulk_insert() {
        let mut cache = QuoteCache::new();
        let points = vec![
            PricePoint {
                date: d(2024, 1, 2),
                price: 185.0,
            },
            PricePoint {
                date: d(2024, 1, 3),
                price: 184.2,
            },
        ];
        cache.set_prices("AAPL", &points);
        assert_eq!(cache.total_entries(), 2);
        assert_eq!(cache.get_price("AAPL", d(2024, 1, 3)), Some(184.2));
    }

    #[test]
    fn range_boundaries_are_inclusive() {
        let mut cache = QuoteCache::new();
        for (day, price) in [(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)] {
            cache.set_price("AAPL", d(2024, 1, day), price);
        }
        let range = cache.get_price_range("AAPL", d(2024, 1, 2), d(2024, 1, 3));
        assert_eq!(range.len(), 2);
        assert_eq!(range[0].price, 2.0);
        assert_eq!(range[1].price, 3.0);
    }

    #[test]
    fn range_for_unknown_symbol_is_empty() {
        let cache = QuoteCache::new();
        assert!(cache
            .get_price_range("AAPL", d(2024, 1, 1), d(2024, 1, 31))
            .is_empty());
    }

    #[test]
    fn counts_span_symbols() {
        let mut cache = QuoteCache::new();
        cache.set_price("AAPL", d(2024, 1, 2), 185.0);
        cache.set_price("AAPL", d(2024, 1, 3), 184.2);
        cache.set_price("MSFT", d(2024, 1, 2), 370.0);
        assert_eq!(cache.total_entries(), 3);
        assert_eq!(cache.symbol_count(), 2);
    }

    #[test]
    fn prune_before_removes_old_entries() {
        let mut cache = QuoteCache::new();
        cache.set_price("AAPL", d(2023, 1, 2), 130.0);
        cache.set_price("AAPL", d(2024, 1, 2), 185.0);
        cache.set_price("MSFT", d(2023, 6, 1), 330.0);

        let removed = cache.prune_before(d(2024, 1, 1));
        assert_eq!(removed, 2);
        assert_eq!(cache.get_price("AAPL", d(2024, 1, 2)), Some(185.0));
        assert_eq!(cache.get_price("AAPL", d(2023, 1, 2)), None);
        // MSFT series emptied out entirely
        assert_eq!(cache.symbol_count(), 1);
    }

    #[test]
    fn prune_drops_stale_freshness_markers() {
        let mut cache = QuoteCache::new();
        cache.set_price("MSFT", d(2023, 6, 1), 330.0);
        cache.mark_updated_today("MSFT", d(2023, 6, 1));

        cache.prune_before(d(2024, 1, 1));
        assert!(!cache.is_today_fresh("MSFT", d(2023, 6, 1)));
    }

    #[test]
    fn clear_empties_everything() {
        let mut cache = QuoteCache::new();
        cache.set_price("AAPL", d(2024, 1, 2), 185.0);
        cache.mark_updated_today("AAPL", d(2024, 1, 2));
        cache.clear();
        assert_eq!(cache.total_entries(), 0);
        assert_eq!(cache.symbol_count(), 0);
        assert!(!cache.is_today_fresh("AAPL", d(2024, 1, 2)));
    }

    #[test]
    fn today_freshness_tracking() {
        let mut cache = QuoteCache::new();
        let today = d(2024, 1, 5);
        assert!(!cache.is_today_fresh("AAPL", today));
        cache.mark_updated_today("AAPL", today);
        assert!(cache.is_today_fresh("AAPL", today));
        // Next day — marker is stale
        assert!(!cache.is_today_fresh("AAPL", d(2024, 1, 6)));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ValuationReport
// ═══════════════════════════════════════════════════════════════════

mod report {
    use super::*;

    #[test]
    fn quote_currency_is_usd() {
        assert_eq!(QUOTE_CURRENCY, "USD");
    }

    #[test]
    fn serde_roundtrip_json() {
        let report = ValuationReport {
            start_date: d(2024, 1, 2),
            end_date: d(2024, 6, 3),
            currency: QUOTE_CURRENCY.to_string(),
            profit: 50.0,
            annualized_return: 0.1,
            reference_symbol: Some("AAPL".to_string()),
            instruments: vec![InstrumentBreakdown {
                symbol: "AAPL".to_string(),
                start_price: 100.0,
                end_price: 150.0,
                delta: 50.0,
            }],
        };

        let json = serde_json::to_string(&report).unwrap();
        let back: ValuationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.profit, 50.0);
        assert_eq!(back.reference_symbol.as_deref(), Some("AAPL"));
        assert_eq!(back.instruments.len(), 1);
        assert_eq!(back.instruments[0].delta, 50.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn default_has_no_api_keys() {
        let s = Settings::default();
        assert!(s.api_keys.is_empty());
    }

    #[test]
    fn from_env_picks_up_polygon_key() {
        // Single test touching the env var to avoid races between
        // parallel tests.
        std::env::set_var(POLYGON_API_KEY_ENV, "test-key-123");
        let s = Settings::from_env();
        assert_eq!(s.api_keys.get("polygon").map(String::as_str), Some("test-key-123"));

        std::env::remove_var(POLYGON_API_KEY_ENV);
        let s = Settings::from_env();
        assert!(s.api_keys.is_empty());
    }
}
