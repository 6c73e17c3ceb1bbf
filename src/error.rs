use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::page::PageError;

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load page: {0}")]
    Navigation(String),

    #[error("Accessibility engine failed: {0}")]
    RuleEngine(String),

    #[error("Extended checks failed: {0}")]
    ExtendedChecks(String),

    #[error("Check not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("{0}")]
    Page(#[from] PageError),
}

impl IntoResponse for AuditError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuditError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            AuditError::NotFound => StatusCode::NOT_FOUND,
            AuditError::Navigation(_)
            | AuditError::RuleEngine(_)
            | AuditError::ExtendedChecks(_)
            | AuditError::Storage(_)
            | AuditError::Page(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}
