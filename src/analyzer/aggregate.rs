//! Result aggregator: sequences the analyzers over one rendered page.
//!
//! The pipeline is strictly sequential. The rule engine and the extended
//! probe share the live page's script context, and the HTML snapshot must be
//! captured before the page can be considered stable for validation, so
//! nothing here runs concurrently. Page load and both in-page analyzers are
//! fatal; the markup validator degrades instead. Every external call is
//! attempted exactly once.

use tracing::{info, warn};

use crate::browser::Browser;
use crate::config::AuditorConfig;
use crate::error::AuditError;
use crate::html_validator::validate_html;
use crate::page::RenderedPage;
use crate::report::AnalysisResult;

use super::axe;
use super::extended;

/// Full analysis for one URL: acquire a page, run the pipeline, and close
/// the page on every exit path before returning or re-raising.
pub async fn analyze_url(
    config: &AuditorConfig,
    http_client: &reqwest::Client,
    url: &str,
) -> Result<AnalysisResult, AuditError> {
    let axe_source = axe::load_axe_bundle(&config.axe_script).await?;

    let browser = Browser::connect(&config.chrome_endpoint, http_client.clone()).await?;
    let page = browser.open_page().await?;

    let result = run_analysis(&page, url, &axe_source, http_client, &config.validator_url).await;

    if let Err(e) = page.close().await {
        warn!("Failed to close page: {}", e);
    }

    result
}

/// The pipeline itself, over an already-acquired page. Separated from
/// [`analyze_url`] so tests can drive it with a canned page.
pub async fn run_analysis(
    page: &dyn RenderedPage,
    url: &str,
    axe_source: &str,
    http_client: &reqwest::Client,
    validator_url: &str,
) -> Result<AnalysisResult, AuditError> {
    let tested_url = page
        .navigate(url)
        .await
        .map_err(|e| AuditError::Navigation(e.to_string()))?;
    let page_title = page.title().await?;
    let html = page.html().await?;
    info!("Loaded {} ({} bytes of HTML)", tested_url, html.len());

    let axe_results = axe::run_rule_engine(page, axe_source).await?;
    info!(
        "Rule engine: {} violations, {} passes",
        axe_results.violations.len(),
        axe_results.passes.len()
    );

    let validation = validate_html(http_client, validator_url, &html).await;
    if validation.validation_failed {
        info!("Markup validation degraded, continuing without it");
    } else {
        info!(
            "Markup validation: {} errors, {} warnings",
            validation.error_count, validation.warning_count
        );
    }

    let extended_checks = extended::run_extended_checks(page).await?;
    info!("Extended checks: {} issues", extended_checks.issue_count());

    let mut critical_count = 0;
    let mut serious_count = 0;
    let mut moderate_count = 0;
    let mut minor_count = 0;
    for violation in &axe_results.violations {
        // Unrecognized impacts stay in the report but out of the buckets.
        match violation.impact.as_str() {
            "critical" => critical_count += 1,
            "serious" => serious_count += 1,
            "moderate" => moderate_count += 1,
            "minor" => minor_count += 1,
            _ => {}
        }
    }

    Ok(AnalysisResult {
        url: url.to_string(),
        tested_url,
        page_title,
        total_violations: axe_results.violations.len() as u32,
        critical_count,
        serious_count,
        moderate_count,
        minor_count,
        passed_count: axe_results.passes.len() as u32,
        violations: axe_results.violations,
        passes: axe_results.passes,
        incomplete: axe_results.incomplete,
        html_error_count: validation.error_count,
        html_warning_count: validation.warning_count,
        html_validation_messages: validation.messages,
        html_validation_failed: validation.validation_failed,
        html_validation_error: validation.validation_error,
        extended_checks,
    })
}
