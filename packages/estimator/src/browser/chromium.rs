//! Chromium-backed render sessions (feature `chromium`).

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{BrowserError, BrowserResult};

use super::pool::{RenderSession, SessionFactory};

const SCROLL_SCRIPT: &str =
    "window.scrollTo(0, document.body.scrollHeight); document.body.scrollHeight";

fn session_err(e: impl std::fmt::Display) -> BrowserError {
    BrowserError::Session(e.to_string())
}

/// Launches one shared Chromium process and hands out pages as sessions.
pub struct ChromiumFactory {
    browser: Arc<Browser>,
}

impl ChromiumFactory {
    /// Launch a headless Chromium and start driving its event handler.
    pub async fn launch() -> BrowserResult<Self> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(BrowserError::Session)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(session_err)?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!(error = %e, "browser handler event error");
                }
            }
            debug!("browser handler loop ended");
        });

        Ok(Self {
            browser: Arc::new(browser),
        })
    }
}

#[async_trait]
impl SessionFactory for ChromiumFactory {
    async fn create(&self) -> BrowserResult<Box<dyn RenderSession>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(session_err)?;
        Ok(Box::new(ChromiumSession { page }))
    }
}

struct ChromiumSession {
    page: Page,
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        debug!(url = %url, "navigating render session");
        self.page.goto(url).await.map_err(session_err)?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(session_err)?;
        Ok(())
    }

    async fn scroll_lazy(&mut self) -> BrowserResult<()> {
        self.page
            .evaluate(SCROLL_SCRIPT)
            .await
            .map_err(session_err)?;
        // Give lazily-loaded entries a beat to render.
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        Ok(())
    }

    async fn query_texts(&mut self, selector: &str) -> BrowserResult<Vec<String>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(session_err)?;

        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            if let Some(text) = element.inner_text().await.map_err(session_err)? {
                let text = text.trim().to_string();
                if !text.is_empty() {
                    texts.push(text);
                }
            }
        }
        Ok(texts)
    }

    async fn body_text(&mut self) -> BrowserResult<String> {
        let value = self
            .page
            .evaluate("document.body.innerText")
            .await
            .map_err(session_err)?;
        value.into_value::<String>().map_err(session_err)
    }
}
