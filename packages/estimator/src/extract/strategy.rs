//! Extraction strategy chain.
//!
//! Strategies run in a fixed priority order and are mutually exclusive per
//! field set: the first strategy to produce a usable result wins outright,
//! and its fields are never merged with a later strategy's. This keeps a
//! half-parsed structured blob from being patched over with markup values
//! that may describe a different listing state.

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

use crate::types::{Marketplace, Provenance};

use super::{markup, structured};

/// Fields a single strategy may produce for an item page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub shipping_price: Option<Decimal>,
    pub buyable: Option<bool>,
    pub image_url: Option<String>,
}

impl FieldSet {
    /// A result is usable only when it carries a price; everything else can
    /// degrade to defaults downstream.
    pub fn is_usable(&self) -> bool {
        self.price.is_some()
    }
}

/// Rejects bodies that are not an HTML page at all.
///
/// Marketplaces sometimes answer a listing URL with a JSON error or config
/// payload; feeding that to the markup strategy can produce plausible-looking
/// garbage, so it is rejected before any strategy runs.
pub fn looks_like_page(body: &str) -> bool {
    let trimmed = body.trim_start();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return false;
    }
    trimmed.contains('<')
}

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").unwrap());

/// Sanitize display price text, e.g. `"US $1,234.56"`.
///
/// Currency tokens and separators are stripped and the whole remainder must
/// be numeric; text with surrounding prose fails the parse instead of
/// yielding a stray digit.
pub fn clean_price(raw: &str) -> Option<Decimal> {
    let cleaned = raw
        .replace("USD", "")
        .replace("US", "")
        .replace('$', "")
        .replace(',', "");
    let cleaned = cleaned.trim();

    if !PRICE_RE.is_match(cleaned) {
        return None;
    }
    cleaned.parse::<Decimal>().ok()
}

/// Run the strategy chain over a page body.
///
/// Returns the first usable result as its price, remaining fields, and
/// provenance; a strategy without a parsed price is skipped entirely, so a
/// returned result always carries one.
pub fn run_chain(body: &str, marketplace: Marketplace) -> Option<(Decimal, FieldSet, Provenance)> {
    if let Some(fields) = structured::extract(body) {
        if let Some(price) = fields.price {
            return Some((price, fields, Provenance::StructuredData));
        }
    }

    let fields = markup::extract(body, marketplace);
    let price = fields.price?;
    Some((price, fields, Provenance::Markup))
}
