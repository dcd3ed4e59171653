//! Structured-data extraction from embedded JSON-LD blobs.
//!
//! Marketplace listing pages embed `application/ld+json` product blobs;
//! these carry exact, typed fields and are preferred over markup scraping.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use super::strategy::{clean_price, FieldSet};

static LD_JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .unwrap()
});

/// Extract item fields from the page's JSON-LD blobs, if any parse.
pub fn extract(body: &str) -> Option<FieldSet> {
    for captures in LD_JSON_RE.captures_iter(body) {
        let Some(raw) = captures.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            continue;
        };

        for node in product_nodes(&value) {
            let fields = fields_from_product(node);
            if fields.is_usable() {
                return Some(fields);
            }
        }
    }
    None
}

/// Walk a JSON-LD document down to its product nodes. Handles a bare
/// product, a top-level array, and an `@graph` wrapper.
fn product_nodes(value: &Value) -> Vec<&Value> {
    let candidates: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => match obj.get("@graph") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => vec![value],
        },
        _ => vec![],
    };

    candidates
        .into_iter()
        .filter(|node| is_product(node))
        .collect()
}

fn is_product(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => t.eq_ignore_ascii_case("product"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.eq_ignore_ascii_case("product")),
        _ => node.get("offers").is_some(),
    }
}

fn fields_from_product(node: &Value) -> FieldSet {
    let mut fields = FieldSet {
        title: node
            .get("name")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        image_url: first_image(node),
        ..FieldSet::default()
    };

    if let Some(offer) = first_offer(node) {
        fields.price = offer
            .get("price")
            .and_then(price_value)
            .or_else(|| {
                offer
                    .get("priceSpecification")
                    .and_then(|spec| spec.get("price"))
                    .and_then(price_value)
            });
        fields.buyable = offer
            .get("availability")
            .and_then(Value::as_str)
            .map(|a| a.contains("InStock"));
    }

    fields
}

fn first_offer(node: &Value) -> Option<&Value> {
    match node.get("offers")? {
        Value::Array(offers) => offers.first(),
        offer @ Value::Object(_) => Some(offer),
        _ => None,
    }
}

/// JSON-LD prices show up as strings or numbers depending on the emitter.
fn price_value(value: &Value) -> Option<rust_decimal::Decimal> {
    match value {
        Value::String(s) => clean_price(s),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

fn first_image(node: &Value) -> Option<String> {
    match node.get("image")? {
        Value::String(s) => Some(s.to_string()),
        Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_string),
        Value::Object(obj) => obj.get("url").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}
