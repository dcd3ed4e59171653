//! Page fetching over plain HTTP.
//!
//! The [`PageFetcher`] trait is the seam between extraction logic and the
//! network; production uses [`HttpFetcher`], tests use the mock in
//! [`crate::testing`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::{EstimateError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A fetched page body plus the metadata extraction needs.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the fetch was issued for.
    pub url: String,
    /// URL after redirects, which may differ from `url`.
    pub final_url: String,
    pub body: String,
    pub content_type: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl FetchedPage {
    /// Whether the response declared itself HTML. A missing content type is
    /// treated as HTML; the body-shape guard still applies downstream.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("html"))
            .unwrap_or(true)
    }
}

/// Fetches marketplace pages and resolves redirecting links.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page, following redirects.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;

    /// Resolve a URL to its redirect target without parsing the body.
    async fn resolve(&self, url: &str) -> Result<String>;
}

/// Production fetcher backed by a shared reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| EstimateError::Network(Box::new(e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        debug!(url = %url, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EstimateError::Network(Box::new(e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(EstimateError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            warn!(url = %url, status = %status, "fetch returned non-success status");
            return Err(EstimateError::Network(
                format!("unexpected status {status} for {url}").into(),
            ));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let body = response
            .text()
            .await
            .map_err(|e| EstimateError::Network(Box::new(e)))?;

        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            body,
            content_type,
            fetched_at: Utc::now(),
        })
    }

    async fn resolve(&self, url: &str) -> Result<String> {
        debug!(url = %url, "resolving redirect target");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EstimateError::Network(Box::new(e)))?;

        Ok(response.url().to_string())
    }
}
