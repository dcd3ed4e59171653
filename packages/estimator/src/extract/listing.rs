//! Item listing extraction.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

use crate::error::{EstimateError, Result};
use crate::fetch::PageFetcher;
use crate::types::{ExtractedItem, ListingUrl, Marketplace};

use super::strategy;

static USERNAME_IN_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"(?:seller|user|owner)"\s*:\s*\{[^}]*"username"\s*:\s*"([^"]+)""#).unwrap()
});

static USERNAME_BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""username"\s*:\s*"([^"]+)""#).unwrap());

static USERS_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']([^"']*/users/[^"'?#]+)["']"#).unwrap()
});

/// Fetches a listing page and runs the extraction strategy chain over it.
pub struct ListingExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl ListingExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Extract item fields from a classified listing URL.
    pub async fn extract(&self, url: &ListingUrl) -> Result<ExtractedItem> {
        let page = self.fetcher.fetch(url.as_str()).await?;

        if !page.is_html() || !strategy::looks_like_page(&page.body) {
            warn!(url = %url, "response is not an HTML page, refusing to parse");
            return Err(EstimateError::Parse {
                url: url.as_str().to_string(),
            });
        }

        let Some((price, fields, provenance)) = strategy::run_chain(&page.body, url.marketplace())
        else {
            return Err(EstimateError::Parse {
                url: url.as_str().to_string(),
            });
        };

        debug!(
            url = %url,
            provenance = ?provenance,
            price = %price,
            "listing extracted"
        );

        let mut item = ExtractedItem::new(url.as_str(), url.marketplace(), price)
            .with_provenance(provenance);
        item.title = fields.title;
        item.shipping_price = fields.shipping_price;
        item.buyable = fields.buyable;
        item.image_url = fields.image_url;
        item.extracted_at = page.fetched_at;

        if url.marketplace() == Marketplace::Grailed {
            item.seller_profile_url = mine_seller_profile(&page.body);
        }

        Ok(item)
    }
}

/// Find the seller's profile URL in a listing page's embedded state or
/// anchor hrefs. Best-effort: `None` just means no seller scoring later.
fn mine_seller_profile(body: &str) -> Option<String> {
    let username = USERNAME_IN_STATE_RE
        .captures(body)
        .or_else(|| USERNAME_BARE_RE.captures(body))
        .map(|c| c[1].trim().to_string())
        .filter(|u| u.len() > 2);

    if let Some(username) = username {
        return Some(format!("https://www.grailed.com/{username}"));
    }

    USERS_HREF_RE.captures(body).map(|c| {
        let href = c[1].trim();
        if href.starts_with('/') {
            format!("https://www.grailed.com{href}")
        } else {
            href.to_string()
        }
    })
}
