//! Configuration tables for the pricing and orchestration layers.
//!
//! All defaults mirror the operational values the estimator ships with;
//! callers override individual fields through the builder methods. Monetary
//! values are fixed-point decimals, never floats.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::pricing::RouteTier;

/// Marketplace commission rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionConfig {
    /// Flat fee charged when the commission basis is below `threshold`.
    pub flat_amount: Decimal,
    /// Basis value at which the commission switches to a percentage.
    pub threshold: Decimal,
    /// Percentage rate applied at or above `threshold`, as a fraction.
    pub percentage_rate: Decimal,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            flat_amount: Decimal::new(1500, 2),
            threshold: Decimal::new(15000, 2),
            percentage_rate: Decimal::new(10, 2),
        }
    }
}

/// One international shipping rate tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingTier {
    pub route: RouteTier,
    /// Minimum order subtotal (inclusive) at which this tier applies.
    pub min_subtotal: Decimal,
    /// Per-kilogram rate for this tier.
    pub per_kg: Decimal,
}

/// International shipping cost structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingConfig {
    /// Floor below which the weight-based cost never drops.
    pub minimum_floor: Decimal,
    /// Tiers in ascending `min_subtotal` order; the last tier whose
    /// threshold the subtotal meets wins.
    pub tiers: Vec<ShippingTier>,
    /// Handling fee for parcels at or under `handling_weight_threshold`.
    pub light_handling_fee: Decimal,
    /// Handling fee for heavier parcels.
    pub heavy_handling_fee: Decimal,
    pub handling_weight_threshold: Decimal,
    /// Weight assumed when no title pattern matches, in kilograms.
    pub default_weight_kg: Decimal,
    /// Domestic shipping assumed when the listing does not state one.
    pub default_domestic_shipping: Decimal,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            minimum_floor: Decimal::new(1399, 2),
            tiers: vec![
                ShippingTier {
                    route: RouteTier::Standard,
                    min_subtotal: Decimal::ZERO,
                    per_kg: Decimal::new(3086, 2),
                },
                ShippingTier {
                    route: RouteTier::Enhanced,
                    min_subtotal: Decimal::new(200, 0),
                    per_kg: Decimal::new(3527, 2),
                },
                ShippingTier {
                    route: RouteTier::Premium,
                    min_subtotal: Decimal::new(1000, 0),
                    per_kg: Decimal::new(4189, 2),
                },
            ],
            light_handling_fee: Decimal::new(300, 2),
            heavy_handling_fee: Decimal::new(500, 2),
            handling_weight_threshold: Decimal::new(136, 2),
            default_weight_kg: Decimal::new(60, 2),
            default_domestic_shipping: Decimal::new(1500, 2),
        }
    }
}

/// Customs duty rules for the import destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomsConfig {
    /// Duty-free threshold, denominated in `duty_currency`.
    pub threshold: Decimal,
    /// ISO code of the currency the threshold is denominated in.
    pub duty_currency: String,
    /// Duty rate applied to the value exceeding the threshold.
    pub duty_rate: Decimal,
    /// Whether domestic shipping counts toward the dutiable value.
    pub include_domestic_shipping: bool,
}

impl Default for CustomsConfig {
    fn default() -> Self {
        Self {
            threshold: Decimal::new(200, 0),
            duty_currency: "EUR".to_string(),
            duty_rate: Decimal::new(15, 2),
            include_domestic_shipping: true,
        }
    }
}

/// Currency conversion settings for the rate provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency the daily rate source quotes everything against.
    pub base_currency: String,
    /// Currency marketplace prices arrive in.
    pub source_currency: String,
    /// Currency converted totals are presented in.
    pub target_currency: String,
    /// Markup added to customer-facing conversion rates, in percent.
    pub markup_percentage: Decimal,
    /// How long a fetched daily rate set stays fresh.
    #[serde(skip, default = "default_rate_ttl")]
    pub rate_ttl: Duration,
}

fn default_rate_ttl() -> Duration {
    Duration::from_secs(3600)
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            base_currency: "RUB".to_string(),
            source_currency: "USD".to_string(),
            target_currency: "RUB".to_string(),
            markup_percentage: Decimal::new(5, 0),
            rate_ttl: default_rate_ttl(),
        }
    }
}

/// Aggregate configuration consumed read-only by the pricing engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub commission: CommissionConfig,
    pub shipping: ShippingConfig,
    pub customs: CustomsConfig,
    pub currency: CurrencyConfig,
}

/// Batch orchestration limits.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Maximum URLs processed concurrently within one batch.
    pub max_concurrent: usize,
    /// Hard deadline for one URL's full pipeline.
    pub task_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            task_timeout: Duration::from_secs(20),
        }
    }
}
