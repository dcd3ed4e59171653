//! Cached rate provider.
//!
//! Wraps a [`RateSource`] with a TTL cache and a single-flight refresh:
//! concurrent callers hitting an expired cache collapse into one outbound
//! fetch, with the rest awaiting the same result. Quotes come in two
//! flavors: markup-bearing conversion quotes into the base currency, and
//! markup-free cross rates between two quoted currencies.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::{RateError, RateResult};
use crate::types::{CurrencyConfig, RateQuote};

use super::source::{DailyRates, RateSource};

#[derive(Clone)]
struct CachedDaily {
    rates: DailyRates,
    fetched_at: DateTime<Utc>,
}

pub struct RateProvider {
    source: Box<dyn RateSource>,
    config: CurrencyConfig,
    cache: RwLock<Option<CachedDaily>>,
    refresh: Mutex<()>,
}

impl RateProvider {
    pub fn new(source: Box<dyn RateSource>, config: CurrencyConfig) -> Self {
        Self {
            source,
            config,
            cache: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &CurrencyConfig {
        &self.config
    }

    /// Markup-bearing quote for converting `from` into the base currency.
    ///
    /// Rounded to two decimal places at the quote boundary; downstream
    /// arithmetic uses the rounded customer-facing rate.
    pub async fn quote(&self, from: &str, to: &str) -> RateResult<RateQuote> {
        if !to.eq_ignore_ascii_case(&self.config.base_currency) {
            return Err(RateError::UnsupportedPair {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let cached = self.daily().await?;
        let per_unit = per_unit_or_err(&cached.rates, from, &self.config.base_currency)?;

        let markup_factor =
            Decimal::ONE + self.config.markup_percentage / Decimal::ONE_HUNDRED;
        let rate = (per_unit * markup_factor)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        Ok(RateQuote {
            from_currency: from.to_ascii_uppercase(),
            to_currency: to.to_ascii_uppercase(),
            rate,
            markup_percentage: self.config.markup_percentage,
            fetched_at: cached.fetched_at,
            ttl: self.config.rate_ttl,
        })
    }

    /// Markup-free cross rate: base-currency value of `from` over `to`,
    /// i.e. how many units of `to` one unit of `from` is worth. Rounded to
    /// four decimal places.
    pub async fn cross_rate(&self, from: &str, to: &str) -> RateResult<Decimal> {
        let cached = self.daily().await?;

        let from_per_unit = per_unit_or_err(&cached.rates, from, &self.config.base_currency)?;
        let to_per_unit = per_unit_or_err(&cached.rates, to, &self.config.base_currency)?;
        if to_per_unit.is_zero() {
            return Err(RateError::UnknownCurrency {
                code: to.to_string(),
            });
        }

        Ok((from_per_unit / to_per_unit)
            .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Current daily table, refreshing through the single-flight guard when
    /// the cache is stale or empty.
    async fn daily(&self) -> RateResult<CachedDaily> {
        let now = Utc::now();

        if let Some(cached) = self.read_fresh(now).await {
            return Ok(cached);
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have refreshed while this one waited.
        if let Some(cached) = self.read_fresh(now).await {
            debug!("rate refresh collapsed into a concurrent fetch");
            return Ok(cached);
        }

        let rates = self.source.fetch_daily().await?;
        info!(as_of = %rates.as_of, "daily rates refreshed");

        let cached = CachedDaily {
            rates,
            fetched_at: Utc::now(),
        };
        *self.cache.write().await = Some(cached.clone());
        Ok(cached)
    }

    async fn read_fresh(&self, now: DateTime<Utc>) -> Option<CachedDaily> {
        let cache = self.cache.read().await;
        cache.as_ref().filter(|c| self.is_fresh(c, now)).cloned()
    }

    fn is_fresh(&self, cached: &CachedDaily, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(cached.fetched_at)
            .to_std()
            .map(|age| age < self.config.rate_ttl)
            .unwrap_or(true)
    }
}

fn per_unit_or_err(rates: &DailyRates, code: &str, base: &str) -> RateResult<Decimal> {
    if code.eq_ignore_ascii_case(base) {
        return Ok(Decimal::ONE);
    }
    rates
        .per_unit(code)
        .ok_or_else(|| RateError::UnknownCurrency {
            code: code.to_string(),
        })
}
