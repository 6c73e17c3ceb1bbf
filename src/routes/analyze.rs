use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;
use tracing::{error, info};

use crate::analyzer;
use crate::error::AuditError;
use crate::report::StoredCheck;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

/// POST /api/analyze. Validates the URL, runs the full pipeline, and
/// returns the stored record. A malformed URL is rejected before any
/// browser work starts.
pub async fn analyze(
    State(state): State<SharedState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<StoredCheck>, AuditError> {
    let parsed = url::Url::parse(&body.url)
        .map_err(|e| AuditError::InvalidUrl(format!("{}: {}", body.url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AuditError::InvalidUrl(format!(
            "Unsupported scheme: {}",
            parsed.scheme()
        )));
    }

    info!("Analyzing {}", body.url);
    let result = analyzer::analyze_url(&state.config, &state.http_client, &body.url)
        .await
        .inspect_err(|e| error!("Analysis of {} failed: {}", body.url, e))?;

    let check = state.store.insert_check(&result)?;
    info!(
        "Stored check {} for {} ({} violations)",
        check.id, body.url, result.total_violations
    );
    Ok(Json(check))
}
