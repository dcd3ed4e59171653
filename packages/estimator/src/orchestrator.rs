//! Batch orchestration: classify, fan out, fan in.
//!
//! Each URL runs as its own task; all tasks are spawned before any is
//! awaited so their network waits overlap, a semaphore caps concurrency,
//! and a per-task timeout cancels only the task that overran. One URL's
//! failure never touches its siblings, and results come back in input
//! order.

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{ErrorKind, EstimateError};
use crate::extract::{ListingExtractor, SellerSignalExtractor};
use crate::fetch::PageFetcher;
use crate::pricing::PricingEngine;
use crate::reliability::{self, advisory::Advisory};
use crate::shortlink;
use crate::types::{
    ExtractedItem, ListingUrl, Marketplace, OrchestratorConfig, PriceBreakdown, ReliabilityScore,
    SellerSignals, UrlKind,
};
use crate::browser::BrowserPool;

/// Classification of a failed outcome, with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&EstimateError> for OutcomeError {
    fn from(error: &EstimateError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Everything produced for one input URL, serializable for downstream
/// presentation and analytics consumers.
#[derive(Debug, Serialize)]
pub struct UrlOutcome {
    pub url: String,
    pub kind: Option<UrlKind>,
    pub item: Option<ExtractedItem>,
    pub breakdown: Option<PriceBreakdown>,
    pub seller_signals: Option<SellerSignals>,
    pub reliability: Option<ReliabilityScore>,
    pub advisory: Option<Advisory>,
    pub error: Option<OutcomeError>,
    pub elapsed_ms: u64,
}

impl UrlOutcome {
    fn empty(url: String, kind: Option<UrlKind>) -> Self {
        Self {
            url,
            kind,
            item: None,
            breakdown: None,
            seller_signals: None,
            reliability: None,
            advisory: None,
            error: None,
            elapsed_ms: 0,
        }
    }

    fn failure(url: String, kind: Option<UrlKind>, error: OutcomeError) -> Self {
        Self {
            error: Some(error),
            ..Self::empty(url, kind)
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

enum Slot {
    Immediate(UrlOutcome),
    Spawned,
}

/// Drives the full per-URL pipeline over a batch.
#[derive(Clone)]
pub struct Orchestrator {
    fetcher: Arc<dyn PageFetcher>,
    listings: Arc<ListingExtractor>,
    sellers: Arc<SellerSignalExtractor>,
    engine: Arc<PricingEngine>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        pool: Arc<BrowserPool>,
        engine: Arc<PricingEngine>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            listings: Arc::new(ListingExtractor::new(Arc::clone(&fetcher))),
            sellers: Arc::new(SellerSignalExtractor::new(pool)),
            fetcher,
            engine,
            config,
        }
    }

    /// Process a batch of raw URLs.
    ///
    /// Returns one outcome per supported URL, in input order. URLs that
    /// classify as unsupported page types are dropped up front; URLs that
    /// fail to classify at all produce an error outcome so the caller sees
    /// why they went missing.
    pub async fn process_batch(&self, raw_urls: &[String]) -> Vec<UrlOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));
        let mut slots = Vec::with_capacity(raw_urls.len());
        let mut handles = Vec::new();
        let mut spawned_urls = Vec::new();

        for raw in raw_urls {
            let url = match ListingUrl::classify(raw) {
                Ok(url) => url,
                Err(e) => {
                    slots.push(Slot::Immediate(UrlOutcome::failure(
                        raw.clone(),
                        None,
                        OutcomeError::from(&e),
                    )));
                    continue;
                }
            };

            if *url.kind() == UrlKind::Unsupported {
                debug!(url = %url, "dropping unsupported page type");
                continue;
            }

            let this = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let raw = raw.clone();
            spawned_urls.push(raw.clone());

            let handle = tokio::spawn(async move {
                let started = Instant::now();

                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return UrlOutcome::failure(
                        raw,
                        Some(url.kind().clone()),
                        OutcomeError {
                            kind: ErrorKind::ResourceExhausted,
                            message: "batch scheduler shut down".to_string(),
                        },
                    );
                };

                let timeout = this.config.task_timeout;
                let kind = url.kind().clone();
                let mut outcome =
                    match tokio::time::timeout(timeout, this.process_one(url)).await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            let timed_out = EstimateError::Timeout { url: raw.clone() };
                            warn!(url = %raw, "per-url task timed out");
                            UrlOutcome::failure(raw, Some(kind), OutcomeError::from(&timed_out))
                        }
                    };

                outcome.elapsed_ms = started.elapsed().as_millis() as u64;
                outcome
            });

            slots.push(Slot::Spawned);
            handles.push(handle);
        }

        // Fan-in: spawned results come back in spawn order, so the two
        // iterators stay aligned while stitching outcomes into input order.
        let mut joined = join_all(handles).await.into_iter();
        let mut spawned_urls = spawned_urls.into_iter();

        let mut results = Vec::with_capacity(slots.len());
        for slot in slots {
            match slot {
                Slot::Immediate(outcome) => results.push(outcome),
                Slot::Spawned => {
                    let (Some(join_result), Some(url)) = (joined.next(), spawned_urls.next())
                    else {
                        continue;
                    };
                    match join_result {
                        Ok(outcome) => results.push(outcome),
                        Err(e) => {
                            warn!(url = %url, error = %e, "per-url task aborted");
                            results.push(UrlOutcome::failure(
                                url,
                                None,
                                OutcomeError {
                                    kind: ErrorKind::Network,
                                    message: format!("task aborted: {e}"),
                                },
                            ));
                        }
                    }
                }
            }
        }

        info!(
            total = results.len(),
            failed = results.iter().filter(|o| !o.is_success()).count(),
            "batch processed"
        );
        results
    }

    /// Process one classified URL through its full pipeline.
    async fn process_one(&self, url: ListingUrl) -> UrlOutcome {
        match url.kind() {
            UrlKind::Shortlink => self.process_shortlink(url).await,
            UrlKind::ItemListing => self.process_listing(url).await,
            UrlKind::SellerProfile => self.process_seller(url).await,
            UrlKind::Unsupported => UrlOutcome::failure(
                url.as_str().to_string(),
                Some(UrlKind::Unsupported),
                OutcomeError {
                    kind: ErrorKind::Parse,
                    message: "unsupported page type".to_string(),
                },
            ),
        }
    }

    async fn process_shortlink(&self, url: ListingUrl) -> UrlOutcome {
        let resolved = match shortlink::resolve(self.fetcher.as_ref(), url.as_url()).await {
            Ok(resolved) => resolved,
            Err(e) => {
                return UrlOutcome::failure(
                    url.as_str().to_string(),
                    Some(UrlKind::Shortlink),
                    OutcomeError::from(&e),
                );
            }
        };

        let reclassified = match url.reclassify(&resolved) {
            Ok(reclassified) => reclassified,
            Err(e) => {
                return UrlOutcome::failure(
                    url.as_str().to_string(),
                    Some(UrlKind::Shortlink),
                    OutcomeError::from(&e),
                );
            }
        };

        // One hop only; a shortlink resolving to another shortlink or an
        // unsupported page is an error, not a recursion.
        match reclassified.kind() {
            UrlKind::ItemListing => self.process_listing(reclassified).await,
            UrlKind::SellerProfile => self.process_seller(reclassified).await,
            _ => UrlOutcome::failure(
                url.as_str().to_string(),
                Some(UrlKind::Shortlink),
                OutcomeError {
                    kind: ErrorKind::Parse,
                    message: format!("shortlink resolved to unsupported page: {resolved}"),
                },
            ),
        }
    }

    async fn process_listing(&self, url: ListingUrl) -> UrlOutcome {
        let mut outcome =
            UrlOutcome::empty(url.as_str().to_string(), Some(UrlKind::ItemListing));

        let item = match self.listings.extract(&url).await {
            Ok(item) => item,
            Err(e) => {
                outcome.error = Some(OutcomeError::from(&e));
                return outcome;
            }
        };

        let breakdown = self.engine.quote(&item).await;

        let mut signals_for_advisory: Option<SellerSignals> = None;
        if url.marketplace() == Marketplace::Grailed {
            if let Some(profile_url) = &item.seller_profile_url {
                let signals = self.sellers.extract(profile_url).await;
                outcome.reliability = Some(reliability::score(&signals, Utc::now()));
                if signals.has_signal() {
                    signals_for_advisory = Some(signals.clone());
                }
                outcome.seller_signals = Some(signals);
            } else {
                outcome.reliability = Some(ReliabilityScore::no_data());
            }
        }

        outcome.advisory = match url.marketplace() {
            Marketplace::Grailed => {
                reliability::advisory::evaluate(signals_for_advisory.as_ref(), item.buyable)
            }
            Marketplace::Ebay => {
                (item.buyable == Some(false)).then_some(Advisory::NotBuyable)
            }
        };

        if breakdown.converted.is_none() {
            outcome.error = Some(OutcomeError {
                kind: ErrorKind::RateUnavailable,
                message: "conversion rate unavailable; totals are in the source currency only"
                    .to_string(),
            });
        }

        outcome.item = Some(item);
        outcome.breakdown = Some(breakdown);
        outcome
    }

    async fn process_seller(&self, url: ListingUrl) -> UrlOutcome {
        let mut outcome =
            UrlOutcome::empty(url.as_str().to_string(), Some(UrlKind::SellerProfile));

        let signals = self.sellers.extract(url.as_str()).await;
        outcome.reliability = Some(reliability::score(&signals, Utc::now()));
        outcome.advisory = reliability::advisory::evaluate(
            signals.has_signal().then_some(&signals),
            None,
        );
        outcome.seller_signals = Some(signals);
        outcome
    }
}
