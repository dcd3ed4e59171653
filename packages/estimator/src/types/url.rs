//! URL classification for supported marketplaces.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{EstimateError, Result};

/// Marketplaces the estimator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marketplace {
    Ebay,
    Grailed,
}

impl Marketplace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Marketplace::Ebay => "ebay",
            Marketplace::Grailed => "grailed",
        }
    }
}

impl std::fmt::Display for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of page a URL points at, decided from the URL alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlKind {
    /// A single item listing page.
    ItemListing,
    /// A seller profile page.
    SellerProfile,
    /// A branded shortlink that must be resolved before classification.
    Shortlink,
    /// A recognized host but a page type we do not process.
    Unsupported,
}

/// Path segments on the listing site that are site chrome, not usernames.
const RESERVED_SEGMENTS: &[&str] = &[
    "sell",
    "buy",
    "search",
    "help",
    "about",
    "terms",
    "privacy",
    "brands",
    "designers",
    "categories",
    "login",
    "signup",
    "settings",
    "notifications",
    "feed",
];

/// A parsed, classified input URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingUrl {
    url: Url,
    marketplace: Marketplace,
    kind: UrlKind,
}

impl ListingUrl {
    /// Parse and classify a raw URL string.
    ///
    /// Classification is purely lexical: the host selects the marketplace
    /// and the path shape selects the page kind. Shortlink hosts are tagged
    /// [`UrlKind::Shortlink`] and must be resolved before re-classification.
    pub fn classify(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim()).map_err(|_| EstimateError::InvalidUrl {
            url: raw.to_string(),
        })?;

        let host = url
            .host_str()
            .ok_or_else(|| EstimateError::InvalidUrl {
                url: raw.to_string(),
            })?
            .to_ascii_lowercase();

        if host.ends_with(".app.link") {
            return Ok(Self {
                url,
                marketplace: Marketplace::Grailed,
                kind: UrlKind::Shortlink,
            });
        }

        if host == "ebay.com" || host.ends_with(".ebay.com") {
            // Every eBay URL we accept is treated as an item listing; seller
            // scoring is not available for this marketplace.
            return Ok(Self {
                url,
                marketplace: Marketplace::Ebay,
                kind: UrlKind::ItemListing,
            });
        }

        if host == "grailed.com" || host.ends_with(".grailed.com") {
            let kind = Self::classify_grailed_path(&url);
            return Ok(Self {
                url,
                marketplace: Marketplace::Grailed,
                kind,
            });
        }

        Err(EstimateError::InvalidUrl {
            url: raw.to_string(),
        })
    }

    fn classify_grailed_path(url: &Url) -> UrlKind {
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            ["listings", ..] => UrlKind::ItemListing,
            ["users", username, ..] if !username.is_empty() => UrlKind::SellerProfile,
            [single] if !RESERVED_SEGMENTS.contains(single) => UrlKind::SellerProfile,
            _ => UrlKind::Unsupported,
        }
    }

    /// Build from an already-resolved URL, e.g. after shortlink expansion.
    pub fn reclassify(&self, resolved: &str) -> Result<Self> {
        Self::classify(resolved)
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn marketplace(&self) -> Marketplace {
        self.marketplace
    }

    pub fn kind(&self) -> &UrlKind {
        &self.kind
    }
}

impl std::fmt::Display for ListingUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url.as_str())
    }
}
