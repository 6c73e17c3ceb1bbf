use axum::extract::{Path, State};
use axum::response::Json;
use serde::Serialize;
use tracing::error;

use crate::categorize::{self, CategoryAnalysis};
use crate::error::AuditError;
use crate::report::StoredCheck;
use crate::state::SharedState;

/// GET /api/checks/{id}
pub async fn get_check(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<StoredCheck>, AuditError> {
    let check = state
        .store
        .get_check(&id)
        .inspect_err(|e| error!("Failed to load check {}: {}", id, e))?
        .ok_or(AuditError::NotFound)?;
    Ok(Json(check))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub id: String,
    pub url: String,
    pub checked_at: String,
    pub categories: Vec<CategoryAnalysis>,
    pub recommendations: Vec<&'static str>,
}

/// GET /api/checks/{id}/summary. The breakdown is recomputed from the
/// stored violations on every request, never cached.
pub async fn get_summary(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SummaryResponse>, AuditError> {
    let check = state
        .store
        .get_check(&id)
        .inspect_err(|e| error!("Failed to load check {}: {}", id, e))?
        .ok_or(AuditError::NotFound)?;

    let categories = categorize::analyze_violations(&check.result.violations);
    let recommendations = categorize::overall_recommendations(
        &check.result.violations,
        check.result.html_error_count,
        Some(&check.result.extended_checks),
    );

    Ok(Json(SummaryResponse {
        id: check.id,
        url: check.result.url,
        checked_at: check.checked_at,
        categories,
        recommendations,
    }))
}

/// GET /api/history
pub async fn history(
    State(state): State<SharedState>,
) -> Result<Json<Vec<StoredCheck>>, AuditError> {
    let checks = state
        .store
        .list_checks()
        .inspect_err(|e| error!("Failed to list checks: {}", e))?;
    Ok(Json(checks))
}
