//! Test doubles for the network, rate source, and browser seams.
//!
//! Mocks are hand-rolled with canned responses and call tracking so tests
//! can both drive behavior and assert on interaction counts.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::browser::{RenderSession, SessionFactory};
use crate::error::{BrowserError, BrowserResult, EstimateError, RateError, RateResult, Result};
use crate::fetch::{FetchedPage, PageFetcher};
use crate::rates::{DailyRates, RateSource};

/// Canned-response page fetcher.
///
/// URLs without a canned body return [`EstimateError::NotFound`]; URLs
/// registered with [`with_network_error`](Self::with_network_error) fail
/// with a network error instead.
#[derive(Default)]
pub struct MockFetcher {
    pages: RwLock<HashMap<String, String>>,
    redirects: RwLock<HashMap<String, String>>,
    network_errors: RwLock<HashMap<String, ()>>,
    content_types: RwLock<HashMap<String, String>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_html(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), body.into());
        self
    }

    pub fn with_redirect(self, url: impl Into<String>, target: impl Into<String>) -> Self {
        self.redirects
            .write()
            .unwrap()
            .insert(url.into(), target.into());
        self
    }

    pub fn with_network_error(self, url: impl Into<String>) -> Self {
        self.network_errors.write().unwrap().insert(url.into(), ());
        self
    }

    /// Override the content type reported for a URL; the default is
    /// `text/html`.
    pub fn with_content_type(self, url: impl Into<String>, ct: impl Into<String>) -> Self {
        self.content_types
            .write()
            .unwrap()
            .insert(url.into(), ct.into());
        self
    }

    /// URLs fetched or resolved so far, in order.
    pub fn calls(&self) -> Arc<RwLock<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, url: &str) {
        self.calls.write().unwrap().push(url.to_string());
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.record(url);

        if self.network_errors.read().unwrap().contains_key(url) {
            return Err(EstimateError::Network("connection reset".into()));
        }

        let target = self
            .redirects
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());

        let content_type = self
            .content_types
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| "text/html".to_string());

        let body = self.pages.read().unwrap().get(&target).cloned();
        match body {
            Some(body) => Ok(FetchedPage {
                url: url.to_string(),
                final_url: target,
                body,
                content_type: Some(content_type),
                fetched_at: Utc::now(),
            }),
            None => Err(EstimateError::NotFound {
                url: url.to_string(),
            }),
        }
    }

    async fn resolve(&self, url: &str) -> Result<String> {
        self.record(url);

        if self.network_errors.read().unwrap().contains_key(url) {
            return Err(EstimateError::Network("connection reset".into()));
        }

        Ok(self
            .redirects
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string()))
    }
}

/// Canned daily-rate source with a fetch counter.
pub struct MockRateSource {
    rates: HashMap<String, Decimal>,
    failing: bool,
    fetch_delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockRateSource {
    pub fn new() -> Self {
        Self {
            rates: HashMap::new(),
            failing: false,
            fetch_delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose every fetch fails with an unparsable payload.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    pub fn with_rate(mut self, code: impl Into<String>, per_unit: Decimal) -> Self {
        self.rates.insert(code.into(), per_unit);
        self
    }

    /// Delay each fetch, to widen single-flight race windows in tests.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Default for MockRateSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateSource for MockRateSource {
    async fn fetch_daily(&self) -> RateResult<DailyRates> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(RateError::Unparsable);
        }

        let mut daily = DailyRates::new(Utc::now());
        for (code, per_unit) in &self.rates {
            daily = daily.with_rate(code.clone(), *per_unit);
        }
        Ok(daily)
    }
}

#[derive(Default)]
struct MockBrowserState {
    texts: HashMap<String, Vec<String>>,
    body_text: String,
    fail_navigation: bool,
    navigations: RwLock<Vec<String>>,
}

/// Session factory whose sessions answer selector queries from a canned map.
#[derive(Default)]
pub struct MockBrowser {
    state: Arc<MockBrowserState>,
    created: Arc<AtomicUsize>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texts(mut self, selector: impl Into<String>, texts: Vec<String>) -> Self {
        let state = Arc::get_mut(&mut self.state).expect("configure before creating sessions");
        state.texts.insert(selector.into(), texts);
        self
    }

    pub fn with_body_text(mut self, body: impl Into<String>) -> Self {
        let state = Arc::get_mut(&mut self.state).expect("configure before creating sessions");
        state.body_text = body.into();
        self
    }

    /// Make every navigation fail with a session error.
    pub fn with_failing_navigation(mut self) -> Self {
        let state = Arc::get_mut(&mut self.state).expect("configure before creating sessions");
        state.fail_navigation = true;
        self
    }

    /// Counter of sessions created by this factory.
    pub fn created_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.created)
    }

    /// URLs navigated to by any session from this factory.
    pub fn navigations(&self) -> Vec<String> {
        self.state.navigations.read().unwrap().clone()
    }
}

#[async_trait]
impl SessionFactory for MockBrowser {
    async fn create(&self) -> BrowserResult<Box<dyn RenderSession>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockSession {
    state: Arc<MockBrowserState>,
}

#[async_trait]
impl RenderSession for MockSession {
    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        if self.state.fail_navigation {
            return Err(BrowserError::Session("navigation failed".to_string()));
        }
        self.state
            .navigations
            .write()
            .unwrap()
            .push(url.to_string());
        Ok(())
    }

    async fn scroll_lazy(&mut self) -> BrowserResult<()> {
        Ok(())
    }

    async fn query_texts(&mut self, selector: &str) -> BrowserResult<Vec<String>> {
        Ok(self
            .state
            .texts
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn body_text(&mut self) -> BrowserResult<String> {
        Ok(self.state.body_text.clone())
    }
}
