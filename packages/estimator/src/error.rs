//! Typed errors for the estimation library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Every failed URL in a batch
//! carries an [`ErrorKind`] classification for the presentation and
//! analytics collaborators.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while estimating a single URL.
#[derive(Debug, Error)]
pub enum EstimateError {
    /// Connection-level failure talking to a marketplace.
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The per-URL task exceeded its timeout.
    #[error("request timed out: {url}")]
    Timeout { url: String },

    /// Page content did not match any extraction strategy.
    #[error("no extraction strategy matched: {url}")]
    Parse { url: String },

    /// Target resource confirmed absent (e.g. a delisted item).
    #[error("resource not found: {url}")]
    NotFound { url: String },

    /// A mandatory field could not be extracted. Optional fields degrade to
    /// configured defaults instead; this error is reserved for fields the
    /// computation cannot proceed without.
    #[error("mandatory field missing from extraction: {field}")]
    DegradedData { field: &'static str },

    /// Exchange rate source unreachable or unparsable.
    #[error("exchange rate unavailable: {0}")]
    RateUnavailable(#[from] RateError),

    /// Browser-dependent extraction could not run.
    #[error("browser unavailable: {0}")]
    Browser(#[from] BrowserError),

    /// URL could not be parsed at all.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl EstimateError {
    /// Classify this error for per-URL outcome reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EstimateError::Network(_) | EstimateError::Timeout { .. } => ErrorKind::Network,
            EstimateError::Parse { .. } | EstimateError::InvalidUrl { .. } => ErrorKind::Parse,
            EstimateError::NotFound { .. } => ErrorKind::NotFound,
            EstimateError::DegradedData { .. } => ErrorKind::DegradedData,
            EstimateError::RateUnavailable(_) => ErrorKind::RateUnavailable,
            EstimateError::Browser(BrowserError::Session(_)) => ErrorKind::Network,
            EstimateError::Browser(_) => ErrorKind::ResourceExhausted,
        }
    }
}

/// Errors from the currency rate provider.
#[derive(Debug, Error)]
pub enum RateError {
    /// HTTP request to the rate source failed.
    #[error("rate source HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The daily payload could not be parsed.
    #[error("rate source returned an unparsable payload")]
    Unparsable,

    /// The source does not quote this currency.
    #[error("currency not quoted by source: {code}")]
    UnknownCurrency { code: String },

    /// The provider cannot derive a rate for this pair.
    #[error("unsupported currency pair: {from}/{to}")]
    UnsupportedPair { from: String, to: String },
}

/// Errors from the browser pool and render sessions.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Headless rendering is disabled by configuration.
    #[error("browser rendering is disabled")]
    Disabled,

    /// Pool stayed at capacity beyond the wait budget.
    #[error("browser pool at capacity beyond wait budget")]
    Exhausted,

    /// A render session operation failed.
    #[error("render session failed: {0}")]
    Session(String),
}

/// Per-URL error classification attached to failed batch outcomes.
///
/// Errors are isolated per URL: one URL's classification never aborts or
/// taints sibling results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Retryable by re-issuing the whole per-URL task (not retried here).
    Network,
    /// Not retried; the page did not yield coherent data.
    Parse,
    /// Not retried; the resource is confirmed gone.
    NotFound,
    /// Partial extraction; computation refused a mandatory field.
    DegradedData,
    /// Conversion/duty disabled for this request; no stale fallback used.
    RateUnavailable,
    /// Browser pool saturated beyond the wait budget.
    ResourceExhausted,
}

/// Result type alias for estimation operations.
pub type Result<T> = std::result::Result<T, EstimateError>;

/// Result type alias for rate operations.
pub type RateResult<T> = std::result::Result<T, RateError>;

/// Result type alias for browser operations.
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;
