//! Extended heuristic checks.
//!
//! Five supplementary DOM checks the rule engine does not cover: viewport
//! zoom lock, autoplaying media, positive tabindex usage, focus-visibility
//! CSS presence, and timed auto-refresh. One probe script gathers raw facts
//! from the live DOM in a single evaluation; the policies that turn those
//! facts into sub-reports are plain functions over the probe value. The five
//! sub-checks never short-circuit each other and are always all populated.

use serde::Deserialize;
use tracing::debug;

use crate::error::AuditError;
use crate::page::RenderedPage;
use crate::report::{
    AutoplayElement, AutoplayMediaCheck, ExtendedChecks, FocusVisibleCheck, TabOrderCheck,
    TabindexElement, TimingCheck, ViewportCheck,
};

/// Interactive-element selectors counted by the focus-visibility check.
pub const INTERACTIVE_SELECTORS: [&str; 6] = [
    "a[href]",
    "button",
    "input:not([type=\"hidden\"])",
    "select",
    "textarea",
    "[tabindex]:not([tabindex=\"-1\"])",
];

/// Raw facts gathered from the DOM in one evaluation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomProbe {
    /// `content` attribute of `meta[name=viewport]`, if the tag exists.
    pub viewport_content: Option<String>,
    /// All `audio[autoplay]` elements, then all `video[autoplay]` elements,
    /// each in document encounter order.
    pub media: Vec<ProbeMediaElement>,
    /// Every element bearing a `tabindex` attribute, with its raw value.
    pub tabindex: Vec<ProbeTabindexElement>,
    pub interactive_count: u32,
    /// Whether any accessible stylesheet has a rule mentioning `:focus`.
    /// Cross-origin stylesheets that refuse introspection are skipped.
    pub has_focus_styles: bool,
    pub refresh_meta: bool,
    pub has_set_timeout: bool,
    pub has_set_interval: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeMediaElement {
    pub tag: String,
    pub has_controls: bool,
    pub selector: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeTabindexElement {
    pub selector: String,
    pub value: String,
}

/// Run the probe against the page and apply all five policies. Evaluation
/// failure is fatal: the probe shares the page's script context with the
/// rule engine, and a page whose evaluator is broken cannot produce a
/// trustworthy report.
pub async fn run_extended_checks(page: &dyn RenderedPage) -> Result<ExtendedChecks, AuditError> {
    let value = page
        .evaluate(&probe_script())
        .await
        .map_err(|e| AuditError::ExtendedChecks(e.to_string()))?;

    let probe: DomProbe = serde_json::from_value(value)
        .map_err(|e| AuditError::ExtendedChecks(format!("Unexpected probe shape: {}", e)))?;

    let checks = build_checks(&probe);
    debug!("Extended checks: {} issues", checks.issue_count());
    Ok(checks)
}

/// Apply the five policies to one probe snapshot.
pub fn build_checks(probe: &DomProbe) -> ExtendedChecks {
    ExtendedChecks {
        viewport: check_viewport(probe.viewport_content.as_deref()),
        autoplay_media: check_autoplay(&probe.media),
        tab_order: check_tab_order(&probe.tabindex),
        focus_visible: check_focus_visible(probe.has_focus_styles, probe.interactive_count),
        timing: check_timing(probe.refresh_meta, probe.has_set_timeout, probe.has_set_interval),
    }
}

/// WCAG 1.4.4: `user-scalable=no` or `maximum-scale < 2` lock zoom out for
/// low-vision users. No viewport meta tag means no restriction.
fn check_viewport(content: Option<&str>) -> ViewportCheck {
    let mut check = ViewportCheck {
        blocks_zoom: false,
        user_scalable: true,
        max_scale: None,
        issues: Vec::new(),
    };

    let Some(content) = content else {
        return check;
    };

    for directive in content.split(',') {
        let mut parts = directive.splitn(2, '=');
        let key = parts.next().unwrap_or("").trim().to_ascii_lowercase();
        let value = parts.next().unwrap_or("").trim().to_ascii_lowercase();

        match key.as_str() {
            "user-scalable" if value == "no" => {
                check.user_scalable = false;
                check.blocks_zoom = true;
                check.issues.push(
                    "The viewport meta tag disables zooming with user-scalable=no (WCAG 1.4.4)"
                        .to_string(),
                );
            }
            "maximum-scale" => {
                if let Ok(scale) = value.parse::<f64>() {
                    check.max_scale = Some(scale);
                    if scale < 2.0 {
                        check.blocks_zoom = true;
                        check.issues.push(format!(
                            "The viewport meta tag limits zooming with maximum-scale={} (WCAG 1.4.4)",
                            scale
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    check
}

/// WCAG 1.4.2 / 2.2.2: autoplaying media without controls cannot be paused
/// or silenced. One issue per offending element; every autoplay element is
/// recorded regardless of controls.
fn check_autoplay(media: &[ProbeMediaElement]) -> AutoplayMediaCheck {
    let mut check = AutoplayMediaCheck {
        has_autoplay_audio: false,
        has_autoplay_video: false,
        elements: Vec::new(),
        issues: Vec::new(),
    };

    for el in media {
        match el.tag.as_str() {
            "audio" => check.has_autoplay_audio = true,
            "video" => check.has_autoplay_video = true,
            _ => {}
        }

        if !el.has_controls {
            let issue = match el.tag.as_str() {
                "audio" => format!(
                    "Audio element {} autoplays without controls, users cannot pause or stop the sound (WCAG 1.4.2)",
                    el.selector
                ),
                _ => format!(
                    "Video element {} autoplays without controls, users cannot pause or stop it (WCAG 2.2.2)",
                    el.selector
                ),
            };
            check.issues.push(issue);
        }

        check.elements.push(AutoplayElement {
            tag: el.tag.clone(),
            has_controls: el.has_controls,
            selector: el.selector.clone(),
        });
    }

    check
}

/// WCAG 2.4.3: positive tabindex values override the natural keyboard
/// order. Non-numeric values parse as 0 and are ignored; a single aggregate
/// issue covers all offenders.
fn check_tab_order(elements: &[ProbeTabindexElement]) -> TabOrderCheck {
    let mut check = TabOrderCheck {
        has_positive_tabindex: false,
        max_tabindex: 0,
        elements_with_tabindex: Vec::new(),
        issues: Vec::new(),
    };

    for el in elements {
        let tabindex = el.value.trim().parse::<i32>().unwrap_or(0);
        if tabindex > 0 {
            check.has_positive_tabindex = true;
            check.max_tabindex = check.max_tabindex.max(tabindex);
            check.elements_with_tabindex.push(TabindexElement {
                selector: el.selector.clone(),
                tabindex,
            });
        }
    }

    if check.has_positive_tabindex {
        check.issues.push(format!(
            "{} element(s) have a positive tabindex, which overrides the natural keyboard navigation order (WCAG 2.4.3)",
            check.elements_with_tabindex.len()
        ));
    }

    check
}

/// WCAG 2.4.7: interactive elements need a visible focus indicator. Only
/// flagged when no stylesheet mentions `:focus` AND the page actually has
/// interactive elements.
fn check_focus_visible(has_focus_styles: bool, interactive_count: u32) -> FocusVisibleCheck {
    let mut check = FocusVisibleCheck {
        has_focus_styles,
        elements_without_focus: if has_focus_styles { 0 } else { interactive_count },
        checked_selectors: INTERACTIVE_SELECTORS.iter().map(|s| s.to_string()).collect(),
        issues: Vec::new(),
    };

    if !has_focus_styles && interactive_count > 0 {
        check.issues.push(format!(
            "No :focus styles detected in accessible stylesheets, {} interactive element(s) may have no visible focus indicator (WCAG 2.4.7)",
            interactive_count
        ));
    }

    check
}

/// WCAG 2.2.1: a refresh meta tag reloads or redirects without user
/// control. Timer primitives are reported as information only.
fn check_timing(refresh_meta: bool, has_set_timeout: bool, has_set_interval: bool) -> TimingCheck {
    let mut check = TimingCheck {
        has_set_timeout,
        has_set_interval,
        refresh_meta,
        issues: Vec::new(),
    };

    if refresh_meta {
        check.issues.push(
            "The page contains <meta http-equiv=\"refresh\">, which can reload or redirect the page without user control (WCAG 2.2.1)"
                .to_string(),
        );
    }

    check
}

/// The DOM probe, evaluated once per analysis. Selectors are built as tag
/// name, then `#id` if present, else the first class token, else the bare
/// tag. Stylesheets that throw on `cssRules` access (cross-origin) are
/// skipped without error.
fn probe_script() -> String {
    let interactive = INTERACTIVE_SELECTORS.join(", ");
    format!(
        r#"(() => {{
  const selectorFor = (el) => {{
    const tag = el.tagName.toLowerCase();
    if (el.id) return tag + '#' + el.id;
    const cls = typeof el.className === 'string' ? el.className.trim().split(/\s+/)[0] : '';
    return cls ? tag + '.' + cls : tag;
  }};

  const meta = document.querySelector('meta[name="viewport"]');

  const media = [];
  for (const el of document.querySelectorAll('audio[autoplay]')) {{
    media.push({{ tag: 'audio', hasControls: el.hasAttribute('controls'), selector: selectorFor(el) }});
  }}
  for (const el of document.querySelectorAll('video[autoplay]')) {{
    media.push({{ tag: 'video', hasControls: el.hasAttribute('controls'), selector: selectorFor(el) }});
  }}

  const tabindex = [];
  for (const el of document.querySelectorAll('[tabindex]')) {{
    tabindex.push({{ selector: selectorFor(el), value: el.getAttribute('tabindex') || '' }});
  }}

  let hasFocusStyles = false;
  for (const sheet of document.styleSheets) {{
    let rules = null;
    try {{ rules = sheet.cssRules; }} catch (e) {{ continue; }}
    if (!rules) continue;
    for (const rule of rules) {{
      if (rule.selectorText && rule.selectorText.includes(':focus')) {{
        hasFocusStyles = true;
        break;
      }}
    }}
    if (hasFocusStyles) break;
  }}

  return {{
    viewportContent: meta ? meta.getAttribute('content') : null,
    media: media,
    tabindex: tabindex,
    interactiveCount: document.querySelectorAll('{interactive}').length,
    hasFocusStyles: hasFocusStyles,
    refreshMeta: !!document.querySelector('meta[http-equiv="refresh" i]'),
    hasSetTimeout: typeof window.setTimeout === 'function',
    hasSetInterval: typeof window.setInterval === 'function'
  }};
}})()"#
    )
}
