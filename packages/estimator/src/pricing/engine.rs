//! Landed-cost engine.
//!
//! `compute` works over the extracted item, the configuration tables, and
//! the rates handed to it, declining any conversion quote that has gone
//! stale; `quote` is the thin async wrapper that fetches those rates first.
//! All arithmetic is fixed-point decimal, rounded half-up to two places only
//! at declared output fields.

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::rates::RateProvider;
use crate::types::{
    CommissionKind, ConvertedTotal, ExtractedItem, PriceBreakdown, PricingConfig, RateQuote,
    RouteTier,
};

use super::weight::WeightTable;

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub struct PricingEngine {
    config: PricingConfig,
    rates: Arc<RateProvider>,
    weights: WeightTable,
}

impl PricingEngine {
    pub fn new(config: PricingConfig, rates: Arc<RateProvider>) -> Self {
        Self {
            config,
            rates,
            weights: WeightTable::standard(),
        }
    }

    /// Replace the standard weight table with a caller-supplied one.
    pub fn with_weight_table(mut self, weights: WeightTable) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Fetch current rates and compute the full breakdown.
    ///
    /// Rate failures degrade rather than abort: an unavailable cross rate
    /// disables duty, an unavailable conversion rate leaves `converted`
    /// absent. No stale or fallback number is ever substituted.
    pub async fn quote(&self, item: &ExtractedItem) -> PriceBreakdown {
        let currency = &self.config.currency;

        let duty_cross = match self
            .rates
            .cross_rate(&self.config.customs.duty_currency, &currency.source_currency)
            .await
        {
            Ok(cross) => Some(cross),
            Err(e) => {
                warn!(error = %e, "cross rate unavailable, duty disabled");
                None
            }
        };

        let target_quote = match self
            .rates
            .quote(&currency.source_currency, &currency.target_currency)
            .await
        {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!(error = %e, "conversion rate unavailable, omitting converted total");
                None
            }
        };

        self.compute(item, duty_cross, target_quote.as_ref())
    }

    /// Breakdown computation from already-fetched rates. A target quote past
    /// its freshness window is ignored, leaving `converted` absent.
    pub fn compute(
        &self,
        item: &ExtractedItem,
        duty_cross: Option<Decimal>,
        target: Option<&RateQuote>,
    ) -> PriceBreakdown {
        let shipping_cfg = &self.config.shipping;

        let (domestic_shipping, shipping_defaulted) = match item.shipping_price {
            Some(shipping) => (shipping, false),
            None => (shipping_cfg.default_domestic_shipping, true),
        };

        let commission_basis = item.price + domestic_shipping;
        let (commission, commission_kind) = self.commission(commission_basis);
        let subtotal = item.price + domestic_shipping + commission;

        let customs_duty = duty_cross
            .map(|cross| self.customs_duty(item.price, domestic_shipping, cross))
            .unwrap_or(Decimal::ZERO);

        let title = item.title.as_deref().unwrap_or("");
        let estimate = self
            .weights
            .estimate(title, shipping_cfg.default_weight_kg);
        let (route_tier, international_shipping) =
            self.international_shipping(subtotal, estimate.weight_kg);

        let total = round2(subtotal + customs_duty + international_shipping);

        // A quote past its freshness window is declined outright; absent
        // conversion never means a stale number was used.
        let converted = target
            .filter(|quote| quote.is_fresh(Utc::now()))
            .map(|quote| ConvertedTotal {
                currency: quote.to_currency.clone(),
                amount: round2(total * quote.rate),
                rate: quote.rate,
            });

        debug!(
            price = %item.price,
            subtotal = %subtotal,
            duty = %customs_duty,
            shipping = %international_shipping,
            total = %total,
            "breakdown computed"
        );

        PriceBreakdown {
            item_price: round2(item.price),
            domestic_shipping: round2(domestic_shipping),
            shipping_defaulted,
            commission,
            commission_kind,
            customs_duty,
            international_shipping,
            route_tier,
            weight_kg: estimate.weight_kg,
            weight_matched: estimate.matched,
            total,
            converted,
        }
    }

    fn commission(&self, basis: Decimal) -> (Decimal, CommissionKind) {
        let cfg = &self.config.commission;
        if basis < cfg.threshold {
            (round2(cfg.flat_amount), CommissionKind::Flat)
        } else {
            (round2(basis * cfg.percentage_rate), CommissionKind::Percentage)
        }
    }

    /// Duty on the dutiable value's excess over the threshold, both compared
    /// in the source currency through a markup-free cross rate.
    fn customs_duty(&self, item_price: Decimal, domestic_shipping: Decimal, cross: Decimal) -> Decimal {
        let cfg = &self.config.customs;

        let dutiable = if cfg.include_domestic_shipping {
            item_price + domestic_shipping
        } else {
            item_price
        };

        let threshold = cfg.threshold * cross;
        if dutiable <= threshold {
            return Decimal::ZERO;
        }

        round2((dutiable - threshold) * cfg.duty_rate)
    }

    fn international_shipping(&self, subtotal: Decimal, weight_kg: Decimal) -> (RouteTier, Decimal) {
        let cfg = &self.config.shipping;

        // Tiers ascend by threshold; the last one the subtotal reaches wins.
        let tier = cfg
            .tiers
            .iter()
            .rev()
            .find(|tier| subtotal >= tier.min_subtotal)
            .or_else(|| cfg.tiers.first());

        let (route, per_kg) = match tier {
            Some(tier) => (tier.route, tier.per_kg),
            None => (RouteTier::Standard, Decimal::ZERO),
        };

        let weight_cost = per_kg * weight_kg;
        let base = weight_cost.max(cfg.minimum_floor);
        let handling = if weight_kg <= cfg.handling_weight_threshold {
            cfg.light_handling_fee
        } else {
            cfg.heavy_handling_fee
        };

        (route, round2(base + handling))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateProvider;
    use crate::testing::MockRateSource;
    use crate::types::{CurrencyConfig, Marketplace};
    use proptest::prelude::*;

    fn engine() -> PricingEngine {
        engine_with_source(
            MockRateSource::new()
                .with_rate("USD", Decimal::new(80, 0))
                .with_rate("EUR", Decimal::new(90, 0)),
        )
    }

    fn engine_with_source(source: MockRateSource) -> PricingEngine {
        let rates = Arc::new(RateProvider::new(
            Box::new(source),
            CurrencyConfig::default(),
        ));
        PricingEngine::new(PricingConfig::default(), rates)
    }

    fn item(price: Decimal) -> ExtractedItem {
        ExtractedItem::new(
            "https://www.grailed.com/listings/1-thing",
            Marketplace::Grailed,
            price,
        )
    }

    #[tokio::test]
    async fn test_percentage_commission_at_threshold() {
        let item = item(Decimal::new(120, 0)).with_shipping_price(Decimal::new(40, 0));
        let breakdown = engine().quote(&item).await;

        // Basis $160 is past the $150 threshold.
        assert_eq!(breakdown.commission, Decimal::new(1600, 2));
        assert_eq!(breakdown.commission_kind, CommissionKind::Percentage);
    }

    #[tokio::test]
    async fn test_flat_commission_below_threshold() {
        let item = item(Decimal::new(100, 0)).with_shipping_price(Decimal::new(20, 0));
        let breakdown = engine().quote(&item).await;

        assert_eq!(breakdown.commission, Decimal::new(1500, 2));
        assert_eq!(breakdown.commission_kind, CommissionKind::Flat);
    }

    #[test]
    fn test_commission_continuous_at_threshold() {
        let engine = engine();
        let (below, below_kind) = engine.commission(Decimal::new(14999, 2));
        let (at, at_kind) = engine.commission(Decimal::new(15000, 2));

        // The flat fee and 10% of $150 meet at $15.00, so crossing the
        // threshold changes the kind without a price jump.
        assert_eq!(below, Decimal::new(1500, 2));
        assert_eq!(at, Decimal::new(1500, 2));
        assert_eq!(below_kind, CommissionKind::Flat);
        assert_eq!(at_kind, CommissionKind::Percentage);
    }

    #[test]
    fn test_duty_positive_just_above_threshold() {
        let engine = engine();
        let cross = Decimal::new(11250, 4);

        // Threshold in source currency is 200 * 1.125 = 225.
        assert_eq!(
            engine.customs_duty(Decimal::new(225, 0), Decimal::ZERO, cross),
            Decimal::ZERO
        );
        assert!(engine.customs_duty(Decimal::new(230, 0), Decimal::ZERO, cross) > Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_standard_route_shipping() {
        // $100 + $20 shipping + $15 flat commission = $135 subtotal, default
        // 0.6kg weight: max(13.99, 30.86 * 0.6) + 3 = 21.52.
        let item = item(Decimal::new(100, 0)).with_shipping_price(Decimal::new(20, 0));
        let breakdown = engine().quote(&item).await;

        assert_eq!(breakdown.route_tier, RouteTier::Standard);
        assert_eq!(breakdown.weight_kg, Decimal::new(60, 2));
        assert!(!breakdown.weight_matched);
        assert_eq!(breakdown.international_shipping, Decimal::new(2152, 2));
    }

    #[tokio::test]
    async fn test_shipping_floor_applies_to_light_items() {
        let item = item(Decimal::new(30, 0))
            .with_shipping_price(Decimal::ZERO)
            .with_title("silk pocket square");
        let breakdown = engine().quote(&item).await;

        // 0.08kg: 30.86 * 0.08 = 2.47, floored at 13.99, plus $3 handling.
        assert_eq!(breakdown.international_shipping, Decimal::new(1699, 2));
    }

    #[tokio::test]
    async fn test_heavy_handling_band() {
        let item = item(Decimal::new(50, 0))
            .with_shipping_price(Decimal::ZERO)
            .with_title("Red Wing boots");
        let breakdown = engine().quote(&item).await;

        // 1.8kg is over the 1.36kg handling threshold.
        // max(13.99, 30.86 * 1.8 = 55.548) + 5 = 60.55
        assert_eq!(breakdown.international_shipping, Decimal::new(6055, 2));
        assert_eq!(breakdown.weight_kg, Decimal::new(180, 2));
    }

    #[tokio::test]
    async fn test_route_tier_by_subtotal() {
        let cheap = engine()
            .quote(&item(Decimal::new(100, 0)).with_shipping_price(Decimal::ZERO))
            .await;
        assert_eq!(cheap.route_tier, RouteTier::Standard);

        let mid = engine()
            .quote(&item(Decimal::new(400, 0)).with_shipping_price(Decimal::ZERO))
            .await;
        assert_eq!(mid.route_tier, RouteTier::Enhanced);

        let expensive = engine()
            .quote(&item(Decimal::new(2000, 0)).with_shipping_price(Decimal::ZERO))
            .await;
        assert_eq!(expensive.route_tier, RouteTier::Premium);
    }

    #[tokio::test]
    async fn test_duty_on_excess_over_threshold() {
        // Cross rate EUR->USD = 90/80 = 1.125, threshold = $225.
        // Dutiable $300 + $15 = $315, excess $90, duty $13.50.
        let item = item(Decimal::new(300, 0)).with_shipping_price(Decimal::new(15, 0));
        let breakdown = engine().quote(&item).await;

        assert_eq!(breakdown.customs_duty, Decimal::new(1350, 2));
    }

    #[tokio::test]
    async fn test_no_duty_below_threshold() {
        let item = item(Decimal::new(100, 0)).with_shipping_price(Decimal::new(10, 0));
        let breakdown = engine().quote(&item).await;
        assert_eq!(breakdown.customs_duty, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_missing_shipping_uses_default() {
        let breakdown = engine().quote(&item(Decimal::new(100, 0))).await;
        assert!(breakdown.shipping_defaulted);
        assert_eq!(breakdown.domestic_shipping, Decimal::new(1500, 2));
    }

    #[tokio::test]
    async fn test_converted_total_uses_marked_up_rate() {
        let item = item(Decimal::new(100, 0)).with_shipping_price(Decimal::new(20, 0));
        let breakdown = engine().quote(&item).await;

        let converted = breakdown.converted.expect("conversion rate available");
        assert_eq!(converted.currency, "RUB");
        // 80 * 1.05 = 84.00 marked-up rate.
        assert_eq!(converted.rate, Decimal::new(8400, 2));
        assert_eq!(converted.amount, round2(breakdown.total * converted.rate));
    }

    #[test]
    fn test_stale_quote_declined_by_compute() {
        use crate::types::RateQuote;
        use std::time::Duration as StdDuration;

        let stale = RateQuote {
            from_currency: "USD".to_string(),
            to_currency: "RUB".to_string(),
            rate: Decimal::new(8400, 2),
            markup_percentage: Decimal::new(5, 0),
            fetched_at: Utc::now() - chrono::Duration::hours(2),
            ttl: StdDuration::from_secs(3600),
        };

        let breakdown = engine().compute(&item(Decimal::new(100, 0)), None, Some(&stale));
        assert!(breakdown.converted.is_none());
        assert!(breakdown.total > Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_custom_weight_table_is_used() {
        use crate::pricing::WeightTable;
        use regex::Regex;

        let table = WeightTable::from_entries(vec![(
            Regex::new(r"(?i)anvil").unwrap(),
            Decimal::new(2500, 2),
        )]);
        let engine = engine().with_weight_table(table);

        let item = item(Decimal::new(50, 0))
            .with_shipping_price(Decimal::ZERO)
            .with_title("Acme anvil");
        let breakdown = engine.quote(&item).await;

        assert_eq!(breakdown.weight_kg, Decimal::new(2500, 2));
        assert!(breakdown.weight_matched);
    }

    #[tokio::test]
    async fn test_rate_failure_degrades_without_fallback() {
        let engine = engine_with_source(MockRateSource::failing());
        let item = item(Decimal::new(300, 0)).with_shipping_price(Decimal::new(15, 0));
        let breakdown = engine.quote(&item).await;

        // Source-currency fields still populated; duty and conversion off.
        assert_eq!(breakdown.item_price, Decimal::new(300, 0));
        assert_eq!(breakdown.customs_duty, Decimal::ZERO);
        assert!(breakdown.converted.is_none());
        assert!(breakdown.total > Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_total_is_sum_of_components() {
        let item = item(Decimal::new(250, 0))
            .with_shipping_price(Decimal::new(12, 0))
            .with_title("wool coat");
        let breakdown = engine().quote(&item).await;

        let expected = breakdown.item_price
            + breakdown.domestic_shipping
            + breakdown.commission
            + breakdown.customs_duty
            + breakdown.international_shipping;
        assert_eq!(breakdown.total, round2(expected));
    }

    proptest! {
        #[test]
        fn prop_shipping_monotonic_in_weight(grams_a in 50u32..5000, grams_b in 50u32..5000) {
            let engine = engine();
            let subtotal = Decimal::new(100, 0);
            let wa = Decimal::new(grams_a as i64, 3);
            let wb = Decimal::new(grams_b as i64, 3);

            let (_, cost_a) = engine.international_shipping(subtotal, wa);
            let (_, cost_b) = engine.international_shipping(subtotal, wb);
            if wa <= wb {
                prop_assert!(cost_a <= cost_b);
            } else {
                prop_assert!(cost_b <= cost_a);
            }
        }

        #[test]
        fn prop_commission_monotonic_in_basis(cents_a in 0i64..100_000, cents_b in 0i64..100_000) {
            let engine = engine();
            let (commission_a, _) = engine.commission(Decimal::new(cents_a, 2));
            let (commission_b, _) = engine.commission(Decimal::new(cents_b, 2));
            if cents_a <= cents_b {
                prop_assert!(commission_a <= commission_b);
            }
        }

        #[test]
        fn prop_route_tier_monotonic_in_subtotal(cents_a in 0i64..500_000, cents_b in 0i64..500_000) {
            let engine = engine();
            let weight = Decimal::new(60, 2);
            let sa = Decimal::new(cents_a, 2);
            let sb = Decimal::new(cents_b, 2);

            let (tier_a, _) = engine.international_shipping(sa, weight);
            let (tier_b, _) = engine.international_shipping(sb, weight);
            if sa <= sb {
                prop_assert!(tier_a <= tier_b);
            }
        }
    }
}
