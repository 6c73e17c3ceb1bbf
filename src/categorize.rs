//! Violation categorizer and recommendation reporter.
//!
//! Pure functions from a violations list to a presentation-ready breakdown:
//! no side effects, recomputed on demand for every report, never cached.
//! Categorization is first-match-wins over a fixed ordered keyword table, so
//! a violation lands in at most one category; anything matching no keyword
//! stays out of the breakdown but still counts toward the total.

use serde::Serialize;

use crate::report::{ExtendedChecks, ViolationDetail};

pub struct CategoryRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub recommendations: &'static [&'static str],
}

/// Fixed category table. Order matters: assignment scans top to bottom and
/// stops at the first keyword hit on the rule id.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        name: "Images and alternative text",
        keywords: &["image", "alt", "img"],
        recommendations: &[
            "Add an alt attribute describing the content of every image",
            "Use an empty alt=\"\" or role=\"presentation\" for decorative images",
            "Keep alt text short and accurate",
        ],
    },
    CategoryRule {
        name: "Color contrast",
        keywords: &["color", "contrast"],
        recommendations: &[
            "Raise the contrast between text and background to at least 4.5:1 for body text",
            "Large text (18pt+, or 14pt+ bold) needs a contrast of at least 3:1",
            "Check contrast ratios with a tool when picking colors",
        ],
    },
    CategoryRule {
        name: "Navigation and focus",
        keywords: &["focus", "tabindex", "bypass", "keyboard"],
        recommendations: &[
            "Provide a visible focus indicator on every interactive element",
            "Avoid positive tabindex values",
            "Add a skip-to-content link at the top of the page",
            "Verify the keyboard navigation order is logical",
        ],
    },
    CategoryRule {
        name: "Semantics and structure",
        keywords: &["heading", "landmark", "region", "list", "html-has-lang"],
        recommendations: &[
            "Use a correct heading hierarchy (h1, h2, h3...)",
            "Add semantic HTML5 landmarks (header, main, nav, footer)",
            "Make sure the <html> tag carries a lang attribute",
            "Group related items with <ul> and <ol> lists",
        ],
    },
    CategoryRule {
        name: "Forms and controls",
        keywords: &["label", "form", "input", "button-name", "select"],
        recommendations: &[
            "Associate every form field with a <label>",
            "Give every button descriptive text or an aria-label",
            "Use placeholders as hints only, never as a replacement for a label",
            "Group related fields with <fieldset> and <legend>",
        ],
    },
    CategoryRule {
        name: "ARIA attributes",
        keywords: &["aria"],
        recommendations: &[
            "Prefer native HTML elements over ARIA where possible",
            "Apply ARIA attributes correctly",
            "Check that all required ARIA attributes are present",
            "Avoid conflicts between ARIA and native HTML semantics",
        ],
    },
];

/// Total violation count past which the library-adoption recommendation
/// fires.
const MANY_VIOLATIONS_THRESHOLD: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySeverity {
    Critical,
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAnalysis {
    pub name: &'static str,
    pub count: u32,
    pub severity: CategorySeverity,
    pub recommendations: &'static [&'static str],
}

/// Partition violations into the fixed categories, escalating each
/// category's severity as matches accumulate. Returned sorted by match
/// count, descending; ties keep first-matched order.
pub fn analyze_violations(violations: &[ViolationDetail]) -> Vec<CategoryAnalysis> {
    let mut categories: Vec<(usize, CategoryAnalysis)> = Vec::new();

    for violation in violations {
        for (rule_index, rule) in CATEGORY_RULES.iter().enumerate() {
            if !rule.keywords.iter().any(|k| violation.id.contains(k)) {
                continue;
            }

            let pos = match categories.iter().position(|(i, _)| *i == rule_index) {
                Some(pos) => pos,
                None => {
                    categories.push((
                        rule_index,
                        CategoryAnalysis {
                            name: rule.name,
                            count: 0,
                            severity: CategorySeverity::Low,
                            recommendations: rule.recommendations,
                        },
                    ));
                    categories.len() - 1
                }
            };
            let entry = &mut categories[pos].1;
            entry.count += 1;

            match violation.impact.as_str() {
                "critical" | "serious" => entry.severity = CategorySeverity::Critical,
                "moderate" if entry.severity != CategorySeverity::Critical => {
                    entry.severity = CategorySeverity::High
                }
                _ => {}
            }

            // First match wins; a violation never lands in two categories.
            break;
        }
    }

    let mut result: Vec<CategoryAnalysis> = categories.into_iter().map(|(_, c)| c).collect();
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

/// Overall recommendations, built by fixed-order conditional rules followed
/// by two constant closers. The order is deliberate and never re-sorted.
pub fn overall_recommendations(
    violations: &[ViolationDetail],
    html_error_count: u32,
    extended_checks: Option<&ExtendedChecks>,
) -> Vec<&'static str> {
    let mut recommendations = Vec::new();

    let critical_count = violations
        .iter()
        .filter(|v| v.impact == "critical" || v.impact == "serious")
        .count();

    if critical_count > 0 {
        recommendations.push(
            "Priority 1: fix the critical and serious violations, they have the largest impact on accessibility",
        );
    }

    if html_error_count > 0 {
        recommendations
            .push("Fix the HTML validation errors, invalid markup can confuse screen readers");
    }

    if let Some(checks) = extended_checks {
        if checks.viewport.blocks_zoom {
            recommendations
                .push("Allow page zooming, it is essential for users with low vision");
        }
        if checks.autoplay_media.has_autoplay_audio || checks.autoplay_media.has_autoplay_video {
            recommendations.push("Remove autoplaying media or add playback controls");
        }
    }

    if violations.len() > MANY_VIOLATIONS_THRESHOLD {
        recommendations.push(
            "Consider adopting a UI component library with built-in accessibility support",
        );
    }

    recommendations.push("After fixing, retest with a screen reader (NVDA, JAWS)");
    recommendations.push("Involve users with disabilities in real testing");

    recommendations
}
