pub mod quote_service;
pub mod valuation_service;
