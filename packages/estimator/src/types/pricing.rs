//! Pricing outputs and rate quotes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached exchange rate between two currencies.
///
/// `rate` already carries the configured markup when the quote came from
/// [`quote`](crate::rates::RateProvider::quote); cross rates between two
/// non-base currencies are markup-free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    /// Markup applied on top of the source rate, in percent.
    pub markup_percentage: Decimal,
    pub fetched_at: DateTime<Utc>,
    #[serde(skip)]
    pub ttl: Duration,
}

impl RateQuote {
    /// Whether this quote is still inside its freshness window.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.fetched_at);
        age.to_std().map(|age| age < self.ttl).unwrap_or(true)
    }
}

/// How the marketplace commission was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionKind {
    /// Flat fee applied below the percentage threshold.
    Flat,
    /// Percentage of the commission basis.
    Percentage,
}

/// International shipping tier, selected by the pre-shipping subtotal.
/// Ordered cheapest route first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteTier {
    Standard,
    Enhanced,
    Premium,
}

/// Total converted into the target currency, present only when a fresh
/// conversion rate was available at computation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedTotal {
    pub currency: String,
    pub amount: Decimal,
    pub rate: Decimal,
}

/// Full landed-cost breakdown for one item, in the source currency.
///
/// Every monetary field is rounded half-up to two decimal places; the
/// intermediate arithmetic behind them is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub item_price: Decimal,
    pub domestic_shipping: Decimal,
    /// Whether `domestic_shipping` came from the page or the configured
    /// default.
    pub shipping_defaulted: bool,
    pub commission: Decimal,
    pub commission_kind: CommissionKind,
    pub customs_duty: Decimal,
    pub international_shipping: Decimal,
    pub route_tier: RouteTier,
    /// Estimated item weight in kilograms used for the shipping quote.
    pub weight_kg: Decimal,
    /// Whether the weight came from a category match rather than the default.
    pub weight_matched: bool,
    pub total: Decimal,
    /// Present only when the target-currency rate was fresh at computation
    /// time. Absent means conversion was declined, never stale.
    pub converted: Option<ConvertedTotal>,
}

impl PriceBreakdown {
    /// Pre-shipping subtotal used for route tier selection.
    pub fn subtotal(&self) -> Decimal {
        self.item_price + self.domestic_shipping + self.commission
    }
}
