//! The rendered-page boundary consumed by the analyzers.
//!
//! Everything the audit pipeline needs from a browser is behind
//! [`RenderedPage`]: navigation, title/HTML capture, script evaluation, and
//! teardown. The production implementation lives in `browser.rs`; tests
//! substitute canned pages.

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced across the page boundary.
#[derive(Debug, Error)]
pub enum PageError {
    /// Browser endpoint not reachable or refused the connection.
    #[error("Browser not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    BrowserNotAvailable(String),

    /// WebSocket transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// DevTools protocol error.
    #[error("Protocol error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Navigation failed outright (DNS, TLS, blocked, ...).
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// Script thrown inside the page.
    #[error("Script error: {0}")]
    Script(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// HTTP error during endpoint discovery.
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Page closed")]
    Closed,
}

impl From<reqwest::Error> for PageError {
    fn from(e: reqwest::Error) -> Self {
        PageError::Http(e.to_string())
    }
}

/// One live, exclusively-owned rendered page.
///
/// A handle is acquired per analysis and must be closed on every exit path.
/// `evaluate` awaits promises, so a single expression can drive an async
/// in-page API (such as `axe.run`) to completion.
#[async_trait::async_trait]
pub trait RenderedPage: Send + Sync {
    /// Navigate to `url` and wait for the load to settle, honoring the fixed
    /// navigation timeout. Returns the final URL after redirects.
    async fn navigate(&self, url: &str) -> Result<String, PageError>;

    /// Current document title.
    async fn title(&self) -> Result<String, PageError>;

    /// Serialized HTML of the rendered document.
    async fn html(&self) -> Result<String, PageError>;

    /// Evaluate a script expression in page context and return its resolved
    /// JSON value.
    async fn evaluate(&self, expression: &str) -> Result<Value, PageError>;

    /// Inject a script source into the page before evaluation.
    async fn inject_script(&self, source: &str) -> Result<(), PageError>;

    /// Release the page. Idempotence is not required; callers invoke this
    /// exactly once.
    async fn close(&self) -> Result<(), PageError>;
}
