//! Bounded pool of headless rendering sessions.

pub mod pool;

#[cfg(feature = "chromium")]
pub mod chromium;

pub use pool::{BrowserPool, PooledSession, RenderSession, SessionFactory};
