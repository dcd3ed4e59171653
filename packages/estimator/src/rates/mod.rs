//! Daily exchange rates: fetching, caching, and quoting.

pub mod provider;
pub mod source;

pub use provider::RateProvider;
pub use source::{DailyRates, HttpRateSource, RateSource};
