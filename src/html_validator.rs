//! Markup Validator Adapter.
//!
//! Submits serialized HTML to a Nu-validator-compatible JSON endpoint and
//! normalizes its heterogeneous message shape. The service is optional: any
//! transport failure, non-2xx status, or malformed body degrades into a
//! result with `validation_failed` set instead of aborting the analysis.
//! Exactly one attempt per analysis, no retries.

use anyhow::bail;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;
use tracing::warn;

use crate::config::{VALIDATOR_TIMEOUT_SECS, VALIDATOR_USER_AGENT};
use crate::report::{HtmlValidationMessage, HtmlValidationResult, MessageType};

/// Raw message as the validator emits it. Every field is optional on the
/// wire; absent values default to empty/zero in the normalized output.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawValidatorMessage {
    #[serde(rename = "type", default)]
    pub message_type: String,
    #[serde(default)]
    pub sub_type: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub extract: String,
    #[serde(default)]
    pub first_line: u32,
    #[serde(default)]
    pub last_line: u32,
    #[serde(default)]
    pub first_column: u32,
    #[serde(default)]
    pub last_column: u32,
    #[serde(default)]
    pub hilite_start: u32,
    #[serde(default)]
    pub hilite_length: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawValidatorResponse {
    #[serde(default)]
    pub messages: Vec<RawValidatorMessage>,
}

/// Validate `html` against the configured endpoint. Never fails: service
/// problems come back as a degraded result the caller can detect via
/// `validation_failed`.
pub async fn validate_html(
    client: &reqwest::Client,
    endpoint: &str,
    html: &str,
) -> HtmlValidationResult {
    match try_validate(client, endpoint, html).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Markup validation degraded: {}", e);
            HtmlValidationResult::failed(e.to_string())
        }
    }
}

async fn try_validate(
    client: &reqwest::Client,
    endpoint: &str,
    html: &str,
) -> anyhow::Result<HtmlValidationResult> {
    let response = client
        .post(endpoint)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(USER_AGENT, VALIDATOR_USER_AGENT)
        .timeout(std::time::Duration::from_secs(VALIDATOR_TIMEOUT_SECS))
        .body(html.to_string())
        .send()
        .await?;

    if !response.status().is_success() {
        bail!("Validator returned status {}", response.status().as_u16());
    }

    let body: RawValidatorResponse = response.json().await?;
    Ok(normalize(body))
}

/// Counting rule: `error_count` for raw type "error"; `warning_count` only
/// for raw type "info" with subType "warning". Every message is kept in the
/// output list regardless of classification.
pub fn normalize(body: RawValidatorResponse) -> HtmlValidationResult {
    let mut error_count = 0;
    let mut warning_count = 0;
    let mut messages = Vec::with_capacity(body.messages.len());

    for msg in body.messages {
        let sub_is_warning = msg.sub_type.as_deref() == Some("warning");

        if msg.message_type == "error" {
            error_count += 1;
        } else if msg.message_type == "info" && sub_is_warning {
            warning_count += 1;
        }

        let message_type = if msg.message_type == "error" {
            MessageType::Error
        } else if sub_is_warning {
            MessageType::Warning
        } else {
            MessageType::Info
        };

        messages.push(HtmlValidationMessage {
            message_type,
            message: msg.message,
            extract: msg.extract,
            first_line: msg.first_line,
            last_line: msg.last_line,
            first_column: msg.first_column,
            last_column: msg.last_column,
            hilite_start: msg.hilite_start,
            hilite_length: msg.hilite_length,
        });
    }

    HtmlValidationResult {
        error_count,
        warning_count,
        messages,
        validation_failed: false,
        validation_error: None,
    }
}
