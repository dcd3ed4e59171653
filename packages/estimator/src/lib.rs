//! Marketplace Landed-Cost Estimation Library
//!
//! Turns marketplace listing URLs into full landed-cost breakdowns and
//! seller trust assessments: extraction (structured data first, markup
//! fallback), exchange-rate caching with markup-bearing quotes, pure
//! fixed-point pricing, reliability scoring, and batch orchestration with
//! per-URL error isolation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use estimator::{Orchestrator, HttpFetcher, PricingEngine, RateProvider};
//! use estimator::browser::BrowserPool;
//! use estimator::rates::HttpRateSource;
//! use estimator::types::{CurrencyConfig, OrchestratorConfig, PricingConfig};
//! use std::sync::Arc;
//!
//! let fetcher = Arc::new(HttpFetcher::new()?);
//! let rates = Arc::new(RateProvider::new(
//!     Box::new(HttpRateSource::new(reqwest::Client::new())),
//!     CurrencyConfig::default(),
//! ));
//! let engine = Arc::new(PricingEngine::new(PricingConfig::default(), rates));
//! let pool = Arc::new(BrowserPool::disabled());
//!
//! let orchestrator = Orchestrator::new(fetcher, pool, engine, OrchestratorConfig::default());
//! let outcomes = orchestrator.process_batch(&urls).await;
//! ```
//!
//! # Modules
//!
//! - [`types`] - Data model: URLs, items, signals, breakdowns, configuration
//! - [`fetch`] - HTTP page fetching behind the [`fetch::PageFetcher`] seam
//! - [`extract`] - Listing strategy chain and seller signal extraction
//! - [`browser`] - Bounded pool of headless rendering sessions
//! - [`rates`] - Daily exchange rates with TTL cache and single-flight refresh
//! - [`pricing`] - Pure landed-cost computation over fixed-point decimals
//! - [`reliability`] - Seller scoring bands and buyer advisories
//! - [`orchestrator`] - Batch fan-out/fan-in with per-URL error isolation
//! - [`testing`] - Mock implementations for testing

pub mod browser;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod orchestrator;
pub mod pricing;
pub mod rates;
pub mod reliability;
pub mod shortlink;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use error::{BrowserError, ErrorKind, EstimateError, RateError, Result};
pub use extract::{ListingExtractor, SellerSignalExtractor};
pub use fetch::{FetchedPage, HttpFetcher, PageFetcher};
pub use orchestrator::{Orchestrator, OutcomeError, UrlOutcome};
pub use pricing::PricingEngine;
pub use rates::RateProvider;
pub use reliability::advisory::Advisory;
pub use types::{
    CommissionKind, ConvertedTotal, ExtractedItem, ListingUrl, Marketplace, PriceBreakdown,
    RateQuote, ReliabilityCategory, ReliabilityScore, RouteTier, SellerSignals, UrlKind,
};
