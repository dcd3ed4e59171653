//! Extracted listing data.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::url::Marketplace;

/// Which extraction strategy produced a field set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Parsed from embedded structured data (JSON-LD).
    StructuredData,
    /// Parsed from page markup selectors.
    Markup,
}

/// Fields extracted from a single item listing page.
///
/// Price and shipping are in the marketplace's source currency (USD for the
/// supported marketplaces). `shipping_price` stays `None` when the page does
/// not state it; the pricing engine substitutes the configured default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub url: String,
    pub marketplace: Marketplace,
    pub title: Option<String>,
    pub price: Decimal,
    pub shipping_price: Option<Decimal>,
    pub buyable: Option<bool>,
    pub image_url: Option<String>,
    /// Link to the seller's profile page, when the listing exposes one.
    pub seller_profile_url: Option<String>,
    pub provenance: Provenance,
    pub extracted_at: DateTime<Utc>,
}

impl ExtractedItem {
    pub fn new(url: impl Into<String>, marketplace: Marketplace, price: Decimal) -> Self {
        Self {
            url: url.into(),
            marketplace,
            title: None,
            price,
            shipping_price: None,
            buyable: None,
            image_url: None,
            seller_profile_url: None,
            provenance: Provenance::Markup,
            extracted_at: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_shipping_price(mut self, shipping: Decimal) -> Self {
        self.shipping_price = Some(shipping);
        self
    }

    pub fn with_buyable(mut self, buyable: bool) -> Self {
        self.buyable = Some(buyable);
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_seller_profile_url(mut self, url: impl Into<String>) -> Self {
        self.seller_profile_url = Some(url.into());
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }
}
