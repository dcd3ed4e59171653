//! Markup-based extraction fallback.
//!
//! Selector tables per marketplace, tolerant of layout drift: every field
//! tries several alternative lookups and takes the first that yields a
//! parsable value.

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::types::Marketplace;

use super::strategy::{clean_price, FieldSet};

/// (selector, attribute) pairs; `None` attribute means element text.
const EBAY_PRICE_SELECTORS: &[(&str, Option<&str>)] = &[
    ("meta[itemprop='price']", Some("content")),
    ("span#prcIsum", None),
    ("span#mm-saleDscPrc", None),
];

const EBAY_SHIPPING_SELECTORS: &[(&str, Option<&str>)] = &[
    ("span#fshippingCost", None),
    ("span.vi-price .notranslate", None),
    ("span.u-flL.condText", None),
    ("#shipCostId", None),
];

const GRAILED_PRICE_SELECTORS: &[(&str, Option<&str>)] = &[
    ("meta[property='product:price:amount']", Some("content")),
];

static FREE_SHIPPING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)free shipping").unwrap());

static BUY_NOW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""buyNow"\s*:\s*(true|false)"#).unwrap());

/// Extract item fields from page markup for the given marketplace.
pub fn extract(body: &str, marketplace: Marketplace) -> FieldSet {
    let document = Html::parse_document(body);

    match marketplace {
        Marketplace::Ebay => extract_ebay(&document, body),
        Marketplace::Grailed => extract_grailed(&document, body),
    }
}

fn extract_ebay(document: &Html, body: &str) -> FieldSet {
    let shipping = first_selector_value(document, EBAY_SHIPPING_SELECTORS)
        .and_then(|raw| parse_shipping(&raw))
        .or_else(|| FREE_SHIPPING_RE.is_match(body).then_some(Decimal::ZERO));

    FieldSet {
        title: extract_title(document),
        price: first_selector_value(document, EBAY_PRICE_SELECTORS)
            .as_deref()
            .and_then(clean_price),
        shipping_price: shipping,
        // Listings on this marketplace are purchasable by definition;
        // auction-only pages are out of scope.
        buyable: Some(true),
        image_url: meta_content(document, "meta[property='og:image']"),
    }
}

fn extract_grailed(document: &Html, body: &str) -> FieldSet {
    let price = price_span(document)
        .or_else(|| {
            first_selector_value(document, GRAILED_PRICE_SELECTORS)
                .as_deref()
                .and_then(clean_price)
        });

    // Buyability lives in an embedded state blob; when it is absent, a
    // priced listing is assumed purchasable.
    let buyable = BUY_NOW_RE
        .captures(body)
        .map(|c| &c[1] == "true")
        .or_else(|| price.map(|_| true));

    FieldSet {
        title: extract_title(document),
        price,
        shipping_price: None,
        buyable,
        image_url: meta_content(document, "meta[property='og:image']"),
    }
}

/// First `span` whose class mentions "price", matched case-insensitively by
/// hand since CSS substring matching is case-sensitive here.
fn price_span(document: &Html) -> Option<Decimal> {
    let selector = Selector::parse("span[class]").ok()?;
    document
        .select(&selector)
        .filter(|el| {
            el.value()
                .attr("class")
                .is_some_and(|c| c.to_ascii_lowercase().contains("price"))
        })
        .find_map(|el| clean_price(&element_text(&el)))
}

fn extract_title(document: &Html) -> Option<String> {
    meta_content(document, "meta[property='og:title']").or_else(|| {
        let h1 = Selector::parse("h1").ok()?;
        document
            .select(&h1)
            .map(|el| element_text(&el))
            .find(|t| !t.is_empty())
    })
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .find_map(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn first_selector_value(document: &Html, table: &[(&str, Option<&str>)]) -> Option<String> {
    for (css, attr) in table {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        for element in document.select(&selector) {
            let raw = match attr {
                Some(attr) => element.value().attr(attr).map(|s| s.trim().to_string()),
                None => Some(element_text(&element)),
            };
            if let Some(raw) = raw.filter(|r| !r.is_empty()) {
                return Some(raw);
            }
        }
    }
    None
}

fn parse_shipping(raw: &str) -> Option<Decimal> {
    let lowered = raw.to_lowercase();
    if lowered.contains("free") || lowered.contains("бесплатно") {
        return Some(Decimal::ZERO);
    }
    clean_price(raw)
}

fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
