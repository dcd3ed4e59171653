//! Session pooling with a hard concurrency cap.
//!
//! Rendering sessions are expensive, so a fixed number are shared across
//! extraction tasks. A semaphore enforces the cap; [`PooledSession`] is an
//! RAII guard that returns its session on every exit path, including early
//! returns and errors. Sessions are never shared by two callers at once.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::error::{BrowserError, BrowserResult};

/// One live rendering session: a page that can navigate, scroll, and answer
/// selector queries.
#[async_trait]
pub trait RenderSession: Send + Sync {
    async fn navigate(&mut self, url: &str) -> BrowserResult<()>;

    /// Scroll down the page to trigger lazily-loaded content.
    async fn scroll_lazy(&mut self) -> BrowserResult<()>;

    /// Inner text of every element matching a CSS selector, in document
    /// order. An empty vec means no matches, not an error.
    async fn query_texts(&mut self, selector: &str) -> BrowserResult<Vec<String>>;

    /// Full visible text of the current page body.
    async fn body_text(&mut self) -> BrowserResult<String>;
}

/// Creates fresh sessions when the idle list runs dry.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(&self) -> BrowserResult<Box<dyn RenderSession>>;
}

struct Inner {
    factory: Box<dyn SessionFactory>,
    semaphore: Arc<Semaphore>,
    idle: Mutex<Vec<Box<dyn RenderSession>>>,
    wait_budget: Duration,
}

/// Bounded pool of rendering sessions.
///
/// A disabled pool (no factory configured) fails every acquire with
/// [`BrowserError::Disabled`]; callers degrade to no-data results instead of
/// aborting their whole task.
pub struct BrowserPool {
    inner: Option<Arc<Inner>>,
}

impl BrowserPool {
    pub fn new(factory: Box<dyn SessionFactory>, capacity: usize, wait_budget: Duration) -> Self {
        Self {
            inner: Some(Arc::new(Inner {
                factory,
                semaphore: Arc::new(Semaphore::new(capacity)),
                idle: Mutex::new(Vec::new()),
                wait_budget,
            })),
        }
    }

    /// A pool that refuses every acquire. Used when rendering is turned off
    /// by configuration or no browser binary is available.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Acquire a session, waiting up to the pool's budget for capacity.
    pub async fn acquire(&self) -> BrowserResult<PooledSession> {
        let inner = self.inner.as_ref().ok_or(BrowserError::Disabled)?;

        let permit = tokio::time::timeout(
            inner.wait_budget,
            inner.semaphore.clone().acquire_owned(),
        )
        .await
        .map_err(|_| BrowserError::Exhausted)?
        .map_err(|_| BrowserError::Disabled)?;

        let recycled = {
            let mut idle = inner.idle.lock().map_err(|_| {
                BrowserError::Session("pool idle list poisoned".to_string())
            })?;
            idle.pop()
        };

        let session = match recycled {
            Some(session) => {
                debug!("reusing idle render session");
                session
            }
            None => inner.factory.create().await?,
        };

        Ok(PooledSession {
            session: Some(session),
            inner: Arc::clone(inner),
            _permit: permit,
        })
    }
}

/// RAII guard over an acquired session. Dropping it releases the capacity
/// permit and returns the session to the idle list for reuse.
pub struct PooledSession {
    session: Option<Box<dyn RenderSession>>,
    inner: Arc<Inner>,
    _permit: OwnedSemaphorePermit,
}

impl PooledSession {
    fn session_mut(&mut self) -> BrowserResult<&mut Box<dyn RenderSession>> {
        self.session
            .as_mut()
            .ok_or_else(|| BrowserError::Session("render session already released".to_string()))
    }

    pub async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        self.session_mut()?.navigate(url).await
    }

    pub async fn scroll_lazy(&mut self) -> BrowserResult<()> {
        self.session_mut()?.scroll_lazy().await
    }

    pub async fn query_texts(&mut self, selector: &str) -> BrowserResult<Vec<String>> {
        self.session_mut()?.query_texts(selector).await
    }

    pub async fn body_text(&mut self) -> BrowserResult<String> {
        self.session_mut()?.body_text().await
    }

    /// Drop the underlying session instead of recycling it, e.g. after a
    /// navigation left it in an unknown state.
    pub fn discard(mut self) {
        self.session = None;
    }
}

impl Drop for PooledSession {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            if let Ok(mut idle) = self.inner.idle.lock() {
                idle.push(session);
            }
        }
        // The permit releases with the guard either way.
    }
}
