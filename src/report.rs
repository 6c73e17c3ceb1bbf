//! Report data model shared by the analyzers, the store, and the HTTP
//! surface. Field names serialize in camelCase to keep the wire shape stable
//! for existing consumers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Recognized violation impact levels, in descending severity. Impacts are
/// carried as plain strings from the rule engine; anything outside this list
/// stays in the report but is excluded from the severity tallies.
pub const RECOGNIZED_IMPACTS: &[&str] = &["critical", "serious", "moderate", "minor"];

/// One element instance a rule failed on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationNode {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub target: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_summary: Option<String>,
}

/// One failed rule, exactly as the rule engine reported it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationDetail {
    pub id: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub help_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<ViolationNode>,
}

/// Normalized message classification from the markup validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Error,
    Warning,
    Info,
}

/// One normalized validator message. Missing raw fields default to ''/0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlValidationMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub message: String,
    pub extract: String,
    pub first_line: u32,
    pub last_line: u32,
    pub first_column: u32,
    pub last_column: u32,
    pub hilite_start: u32,
    pub hilite_length: u32,
}

/// Outcome of one markup-validation attempt. A service failure is a value,
/// not an error: `validation_failed` flags the degraded section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlValidationResult {
    pub error_count: u32,
    pub warning_count: u32,
    pub messages: Vec<HtmlValidationMessage>,
    pub validation_failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,
}

impl HtmlValidationResult {
    pub fn failed(error: String) -> Self {
        Self {
            error_count: 0,
            warning_count: 0,
            messages: Vec::new(),
            validation_failed: true,
            validation_error: Some(error),
        }
    }
}

// ============================================================================
// Extended checks
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportCheck {
    pub blocks_zoom: bool,
    pub user_scalable: bool,
    pub max_scale: Option<f64>,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoplayElement {
    pub tag: String,
    pub has_controls: bool,
    pub selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoplayMediaCheck {
    pub has_autoplay_audio: bool,
    pub has_autoplay_video: bool,
    pub elements: Vec<AutoplayElement>,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabindexElement {
    pub selector: String,
    pub tabindex: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabOrderCheck {
    pub has_positive_tabindex: bool,
    pub max_tabindex: i32,
    pub elements_with_tabindex: Vec<TabindexElement>,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusVisibleCheck {
    pub has_focus_styles: bool,
    pub elements_without_focus: u32,
    pub checked_selectors: Vec<String>,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingCheck {
    pub has_set_timeout: bool,
    pub has_set_interval: bool,
    pub refresh_meta: bool,
    pub issues: Vec<String>,
}

/// The five supplementary sub-reports. All five always run together against
/// one page snapshot; there is no partial form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedChecks {
    pub viewport: ViewportCheck,
    pub autoplay_media: AutoplayMediaCheck,
    pub tab_order: TabOrderCheck,
    pub focus_visible: FocusVisibleCheck,
    pub timing: TimingCheck,
}

impl ExtendedChecks {
    pub fn issue_count(&self) -> usize {
        self.viewport.issues.len()
            + self.autoplay_media.issues.len()
            + self.tab_order.issues.len()
            + self.focus_visible.issues.len()
            + self.timing.issues.len()
    }
}

// ============================================================================
// Aggregate result
// ============================================================================

/// Everything one analysis produced. Constructed once by the aggregator,
/// immutable afterwards; the store assigns `id` and `checkedAt` on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub url: String,
    pub tested_url: String,
    pub page_title: String,
    pub total_violations: u32,
    pub critical_count: u32,
    pub serious_count: u32,
    pub moderate_count: u32,
    pub minor_count: u32,
    pub passed_count: u32,
    pub violations: Vec<ViolationDetail>,
    pub passes: Vec<Value>,
    pub incomplete: Vec<Value>,
    pub html_error_count: u32,
    pub html_warning_count: u32,
    pub html_validation_messages: Vec<HtmlValidationMessage>,
    pub html_validation_failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_validation_error: Option<String>,
    pub extended_checks: ExtendedChecks,
}

/// A persisted check: the analysis plus store-assigned identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCheck {
    pub id: String,
    pub checked_at: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
}
