//! Branded shortlink resolution.
//!
//! Attribution shortlinks (`*.app.link`) carry a base64 `data` payload with
//! the canonical listing URL inside; decoding it locally avoids a network
//! round trip. Links without a decodable payload fall back to following the
//! HTTP redirect.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::fetch::PageFetcher;

const CANONICAL_HOST: &str = "https://www.grailed.com";

/// Payload keys that may hold the destination, in preference order.
const CANDIDATE_KEYS: &[&str] = &[
    "$canonical_url",
    "$fallback_url",
    "$og_url",
    "$canonical_identifier",
];

/// Resolve a shortlink to its destination URL.
///
/// Tries the embedded payload first; falls back to an HTTP redirect follow.
pub async fn resolve(fetcher: &dyn PageFetcher, url: &Url) -> Result<String> {
    if let Some(destination) = decode_app_link(url) {
        debug!(url = %url, destination = %destination, "shortlink decoded locally");
        return Ok(destination);
    }

    let destination = fetcher.resolve(url.as_str()).await?;
    debug!(url = %url, destination = %destination, "shortlink resolved via redirect");
    Ok(destination)
}

/// Decode the attribution payload without touching the network.
pub fn decode_app_link(url: &Url) -> Option<String> {
    let encoded = url
        .query_pairs()
        .find(|(key, _)| key == "data")
        .map(|(_, value)| value.into_owned())?;

    // The payload arrives unpadded.
    let padding = "=".repeat((4 - encoded.len() % 4) % 4);
    let raw = URL_SAFE.decode(format!("{encoded}{padding}")).ok()?;
    let payload: Value = serde_json::from_slice(&raw).ok()?;
    let payload = payload.as_object()?;

    CANDIDATE_KEYS
        .iter()
        .filter_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .find_map(canonicalize)
}

/// Validate a candidate and normalize it to a full marketplace URL.
fn canonicalize(value: &str) -> Option<String> {
    if value.starts_with('/') {
        return Some(format!("{CANONICAL_HOST}{value}"));
    }

    if let Ok(parsed) = Url::parse(value) {
        let host = parsed.host_str()?.to_ascii_lowercase();
        if host == "grailed.com" || host.ends_with(".grailed.com") {
            return Some(value.to_string());
        }
        return None;
    }

    // Scheme-less host form, e.g. "www.grailed.com/listings/123".
    if value.starts_with("grailed.com/") || value.starts_with("www.grailed.com/") {
        return Some(format!("https://{value}"));
    }

    None
}
