//! Chrome-backed implementation of the [`RenderedPage`] boundary.
//!
//! Talks to a Chrome/Chromium instance started with
//! `--remote-debugging-port` over the DevTools protocol: pages are created
//! through the HTTP discovery endpoint, then driven over the page's own
//! WebSocket. The audit pipeline is strictly sequential, so one in-flight
//! command per page is enough: responses are read inline until the matching
//! id arrives and events are skipped.

use std::sync::atomic::{AtomicU64, Ordering};

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use crate::config::{
    NAV_POLL_INTERVAL_MS, NAV_TIMEOUT_SECS, PAGE_CALL_TIMEOUT_SECS, PAGE_VIEWPORT_HEIGHT,
    PAGE_VIEWPORT_WIDTH,
};
use crate::page::{PageError, RenderedPage};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Deserialize)]
struct BrowserVersion {
    #[serde(rename = "Browser")]
    browser: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    id: String,
    web_socket_debugger_url: String,
}

#[derive(Debug, Deserialize)]
struct CdpMessage {
    id: Option<u64>,
    result: Option<Value>,
    error: Option<CdpErrorBody>,
    method: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CdpErrorBody {
    code: i64,
    message: String,
}

/// Connection to the browser's discovery endpoint.
pub struct Browser {
    http_endpoint: String,
    client: reqwest::Client,
}

impl Browser {
    /// Verify the debugging endpoint is reachable.
    pub async fn connect(endpoint: &str, client: reqwest::Client) -> Result<Self, PageError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();
        let version_url = format!("{}/json/version", http_endpoint);

        let version: BrowserVersion = client
            .get(&version_url)
            .send()
            .await
            .map_err(|e| PageError::BrowserNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| PageError::BrowserNotAvailable(format!("{}: {}", endpoint, e)))?;

        debug!("Connected to browser: {}", version.browser);

        Ok(Self {
            http_endpoint,
            client,
        })
    }

    /// Create a fresh page and attach to its WebSocket.
    pub async fn open_page(&self) -> Result<ChromePage, PageError> {
        // Chrome requires PUT for /json/new
        let create_url = format!("{}/json/new", self.http_endpoint);
        let page_info: PageInfo = self
            .client
            .put(&create_url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| PageError::Http(format!("page create: {}", e)))?;

        debug!("Created page target {}", page_info.id);

        let (ws, _) = tokio_tungstenite::connect_async(&page_info.web_socket_debugger_url)
            .await
            .map_err(|e| PageError::WebSocket(e.to_string()))?;

        let page = ChromePage {
            target_id: page_info.id,
            http_endpoint: self.http_endpoint.clone(),
            client: self.client.clone(),
            ws: Mutex::new(ws),
            next_id: AtomicU64::new(1),
        };

        // Fixed viewport so audits are comparable across pages
        page.call(
            "Emulation.setDeviceMetricsOverride",
            json!({
                "width": PAGE_VIEWPORT_WIDTH,
                "height": PAGE_VIEWPORT_HEIGHT,
                "deviceScaleFactor": 1,
                "mobile": false,
            }),
        )
        .await?;

        Ok(page)
    }
}

/// One DevTools page target, exclusively owned by a single analysis.
pub struct ChromePage {
    target_id: String,
    http_endpoint: String,
    client: reqwest::Client,
    ws: Mutex<WsStream>,
    next_id: AtomicU64,
}

impl ChromePage {
    /// Send a command and wait for its response, skipping protocol events.
    async fn call(&self, method: &str, params: Value) -> Result<Value, PageError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({ "id": id, "method": method, "params": params });
        let payload = serde_json::to_string(&request)?;
        trace!("CDP send: {}", payload);

        let mut ws = self.ws.lock().await;
        ws.send(Message::Text(payload.into()))
            .await
            .map_err(|e| PageError::WebSocket(e.to_string()))?;

        let recv = async {
            while let Some(msg) = ws.next().await {
                let msg = msg.map_err(|e| PageError::WebSocket(e.to_string()))?;
                let Message::Text(text) = msg else { continue };
                trace!("CDP recv: {}", text);
                let parsed: CdpMessage = match serde_json::from_str(&text) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!("Unparseable CDP message: {}", e);
                        continue;
                    }
                };
                if parsed.id != Some(id) {
                    // Event or stale response; the pipeline never has two
                    // commands in flight on one page.
                    trace!("Skipping CDP frame: {:?}", parsed.method);
                    continue;
                }
                if let Some(error) = parsed.error {
                    return Err(PageError::Protocol {
                        code: error.code,
                        message: error.message,
                    });
                }
                return Ok(parsed.result.unwrap_or(Value::Null));
            }
            Err(PageError::Closed)
        };

        match tokio::time::timeout(std::time::Duration::from_secs(PAGE_CALL_TIMEOUT_SECS), recv)
            .await
        {
            Ok(result) => result,
            Err(_) => Err(PageError::Timeout(format!("{} timed out", method))),
        }
    }

    async fn eval_raw(&self, expression: &str, await_promise: bool) -> Result<Value, PageError> {
        let result = self
            .call(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": await_promise,
                }),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception
                .get("exception")
                .and_then(|e| e.get("description"))
                .or_else(|| exception.get("text"))
                .and_then(|t| t.as_str())
                .unwrap_or("Unknown script error");
            return Err(PageError::Script(text.to_string()));
        }

        Ok(result
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(Value::Null))
    }

    async fn wait_for_load(&self) -> Result<(), PageError> {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_secs(NAV_TIMEOUT_SECS);

        loop {
            let state = self.eval_raw("document.readyState", false).await?;
            if matches!(state.as_str(), Some("complete") | Some("interactive")) {
                return Ok(());
            }
            if start.elapsed() > timeout {
                return Err(PageError::Timeout("Page load timeout".to_string()));
            }
            tokio::time::sleep(std::time::Duration::from_millis(NAV_POLL_INTERVAL_MS)).await;
        }
    }
}

#[async_trait::async_trait]
impl RenderedPage for ChromePage {
    async fn navigate(&self, url: &str) -> Result<String, PageError> {
        let result = self.call("Page.navigate", json!({ "url": url })).await?;

        if let Some(error) = result.get("errorText").and_then(|e| e.as_str()) {
            if !error.is_empty() {
                return Err(PageError::NavigationFailed(error.to_string()));
            }
        }

        self.wait_for_load().await?;

        let final_url = self.eval_raw("window.location.href", false).await?;
        debug!("Navigated to {}", url);
        Ok(final_url.as_str().unwrap_or(url).to_string())
    }

    async fn title(&self) -> Result<String, PageError> {
        let title = self.eval_raw("document.title", false).await?;
        Ok(title.as_str().unwrap_or("").to_string())
    }

    async fn html(&self) -> Result<String, PageError> {
        // outerHTML alone drops the doctype, which the markup validator needs
        let expr = "(document.doctype ? '<!DOCTYPE ' + document.doctype.name + '>\\n' : '') \
                    + document.documentElement.outerHTML";
        let html = self.eval_raw(expr, false).await?;
        Ok(html.as_str().unwrap_or("").to_string())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, PageError> {
        self.eval_raw(expression, true).await
    }

    async fn inject_script(&self, source: &str) -> Result<(), PageError> {
        self.eval_raw(source, false).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), PageError> {
        let close_url = format!("{}/json/close/{}", self.http_endpoint, self.target_id);
        self.client.get(&close_url).send().await?;
        debug!("Closed page target {}", self.target_id);
        Ok(())
    }
}
