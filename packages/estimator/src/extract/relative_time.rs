//! Relative-time phrase resolution.
//!
//! Profile pages express listing activity as "N days ago" style phrases.
//! Parsing is a pure function over the text and a caller-supplied reference
//! instant, so it needs no browser and no clock of its own.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::LazyLock;

static RELATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s+(hour|day|week|month)s?\s+ago\b").unwrap());

/// Resolve the first relative-time phrase in `text` against `now`.
///
/// Months are treated as thirty days; the grammar is deliberately small and
/// anything outside it (e.g. "yesterday", "just now") resolves to `None`.
pub fn parse_relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let captures = RELATIVE_RE.captures(text)?;
    let amount: i64 = captures[1].parse().ok()?;

    let offset = match captures[2].to_ascii_lowercase().as_str() {
        "hour" => Duration::hours(amount),
        "day" => Duration::days(amount),
        "week" => Duration::weeks(amount),
        "month" => Duration::days(amount * 30),
        _ => return None,
    };

    now.checked_sub_signed(offset)
}
