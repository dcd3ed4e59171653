//! Seller signal extraction over a rendered profile page.
//!
//! Profile pages lazy-load their listing grid, so signals come from a pooled
//! browser session: navigate, scroll once, then read each field through its
//! own list of alternative selectors. Fields are independent; a selector
//! that matches nothing leaves only its field empty.

use chrono::Utc;
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

use crate::browser::{BrowserPool, PooledSession};
use crate::error::BrowserResult;
use crate::types::SellerSignals;

use super::relative_time;

const RATING_SELECTORS: &[&str] = &[
    r#"[data-testid*="rating"]"#,
    ".seller-rating",
    ".rating",
    r#"[aria-label*="rating"]"#,
];

const REVIEW_SELECTORS: &[&str] = &[
    r#"[data-testid*="review"]"#,
    ".review-count",
    ".feedback-count",
];

const BADGE_SELECTORS: &[&str] = &[
    r#"[data-testid*="trusted"]"#,
    ".trusted-badge",
    ".verified-seller",
];

static RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-5]\.\d{1,2})\b").unwrap());

static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());

/// Extracts seller trust signals through the browser pool.
pub struct SellerSignalExtractor {
    pool: Arc<BrowserPool>,
}

impl SellerSignalExtractor {
    pub fn new(pool: Arc<BrowserPool>) -> Self {
        Self { pool }
    }

    /// Extract whatever signals the profile page yields.
    ///
    /// Browser unavailability (pool disabled, exhausted, or a session
    /// failure) degrades to an empty signal set rather than an error; the
    /// scorer turns that into its no-data category.
    pub async fn extract(&self, profile_url: &str) -> SellerSignals {
        match self.try_extract(profile_url).await {
            Ok(signals) => signals,
            Err(e) => {
                warn!(url = %profile_url, error = %e, "seller extraction degraded to no data");
                SellerSignals::default()
            }
        }
    }

    async fn try_extract(&self, profile_url: &str) -> BrowserResult<SellerSignals> {
        let mut session = self.pool.acquire().await?;

        // A session that failed to navigate is in an unknown state; drop it
        // instead of recycling it to the next caller.
        if let Err(e) = session.navigate(profile_url).await {
            session.discard();
            return Err(e);
        }
        if let Err(e) = session.scroll_lazy().await {
            session.discard();
            return Err(e);
        }

        let now = Utc::now();
        let mut signals = SellerSignals::default();

        signals.rating = first_field(&mut session, RATING_SELECTORS, parse_rating).await;
        signals.review_count = first_field(&mut session, REVIEW_SELECTORS, parse_count).await;

        // The page rendered, so a missing badge is a real absence.
        signals.trusted_badge = Some(badge_present(&mut session).await);

        signals.last_activity = match session.body_text().await {
            Ok(text) => relative_time::parse_relative(&text, now),
            Err(e) => {
                debug!(url = %profile_url, error = %e, "body text unavailable for activity");
                None
            }
        };

        Ok(signals)
    }
}

/// First parsable value across a field's alternative selectors. Selector
/// failures are skipped; they usually mean the layout variant is absent.
async fn first_field<T>(
    session: &mut PooledSession,
    selectors: &[&str],
    parse: fn(&str) -> Option<T>,
) -> Option<T> {
    for selector in selectors {
        let texts = match session.query_texts(selector).await {
            Ok(texts) => texts,
            Err(_) => continue,
        };
        for text in &texts {
            if let Some(value) = parse(text) {
                return Some(value);
            }
        }
    }
    None
}

async fn badge_present(session: &mut PooledSession) -> bool {
    for selector in BADGE_SELECTORS {
        if let Ok(texts) = session.query_texts(selector).await {
            if !texts.is_empty() {
                return true;
            }
        }
    }
    false
}

fn parse_rating(text: &str) -> Option<Decimal> {
    let captures = RATING_RE.captures(text)?;
    let rating: Decimal = captures[1].parse().ok()?;
    (rating >= Decimal::ZERO && rating <= Decimal::new(5, 0)).then_some(rating)
}

fn parse_count(text: &str) -> Option<u32> {
    let captures = COUNT_RE.captures(text)?;
    let count: u32 = captures[1].parse().ok()?;
    (count > 0).then_some(count)
}
