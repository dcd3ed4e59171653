//! Core data types for extraction and computation.
//!
//! All request-scoped values here are freshly constructed per batch and
//! discarded with the response; nothing aliases into shared structures.

pub mod config;
pub mod item;
pub mod pricing;
pub mod score;
pub mod seller;
pub mod url;

pub use config::{
    CommissionConfig, CurrencyConfig, CustomsConfig, OrchestratorConfig, PricingConfig,
    ShippingConfig, ShippingTier,
};
pub use item::{ExtractedItem, Provenance};
pub use pricing::{CommissionKind, ConvertedTotal, PriceBreakdown, RateQuote, RouteTier};
pub use score::{ReliabilityCategory, ReliabilityScore};
pub use seller::SellerSignals;
pub use url::{ListingUrl, Marketplace, UrlKind};
