//! Accessibility rule engine adapter.
//!
//! Injects the axe-core bundle into the live page and runs it restricted to
//! the WCAG 2.0/2.1 A+AA conformance tags. The engine is a black box: its
//! violations, passes, and incomplete lists come back exactly as produced.
//! Any failure here is fatal to the analysis.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::config::WCAG_TAGS;
use crate::error::AuditError;
use crate::page::RenderedPage;
use crate::report::ViolationDetail;

/// The rule engine's result shape. `violations` is typed; `passes` and
/// `incomplete` stay opaque since nothing downstream interprets them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AxeResults {
    #[serde(default)]
    pub violations: Vec<ViolationDetail>,
    #[serde(default)]
    pub passes: Vec<Value>,
    #[serde(default)]
    pub incomplete: Vec<Value>,
}

/// Read the axe-core bundle from disk. A missing bundle is a rule-engine
/// failure, not a startup failure: the service stays up and reports it per
/// analysis.
pub async fn load_axe_bundle(path: &Path) -> Result<String, AuditError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        AuditError::RuleEngine(format!(
            "Cannot read axe-core bundle at {}: {} (see assets/README.md)",
            path.display(),
            e
        ))
    })
}

/// The single awaited `axe.run` invocation, restricted to the conformance
/// profile.
pub fn axe_run_expression() -> String {
    let tags = WCAG_TAGS
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "axe.run({{ runOnly: {{ type: 'tag', values: [{}] }} }})",
        tags
    )
}

/// Inject the bundle and run the engine against the current DOM.
pub async fn run_rule_engine(
    page: &dyn RenderedPage,
    axe_source: &str,
) -> Result<AxeResults, AuditError> {
    page.inject_script(axe_source)
        .await
        .map_err(|e| AuditError::RuleEngine(format!("Bundle injection failed: {}", e)))?;

    let value = page
        .evaluate(&axe_run_expression())
        .await
        .map_err(|e| AuditError::RuleEngine(e.to_string()))?;

    let results: AxeResults = serde_json::from_value(value)
        .map_err(|e| AuditError::RuleEngine(format!("Unexpected result shape: {}", e)))?;

    debug!(
        "Rule engine: {} violations, {} passes, {} incomplete",
        results.violations.len(),
        results.passes.len(),
        results.incomplete.len()
    );
    Ok(results)
}
