use tempfile::tempdir;

use wcag_auditor::report::{
    AnalysisResult, AutoplayMediaCheck, ExtendedChecks, FocusVisibleCheck, TabOrderCheck,
    TimingCheck, ViewportCheck, ViolationDetail, ViolationNode,
};
use wcag_auditor::storage::CheckStore;

fn sample_result(url: &str) -> AnalysisResult {
    AnalysisResult {
        url: url.to_string(),
        tested_url: format!("{}/", url),
        page_title: "Sample".to_string(),
        total_violations: 1,
        critical_count: 1,
        serious_count: 0,
        moderate_count: 0,
        minor_count: 0,
        passed_count: 12,
        violations: vec![ViolationDetail {
            id: "image-alt".to_string(),
            impact: "critical".to_string(),
            description: "Images must have alternate text".to_string(),
            help: "Images must have alternate text".to_string(),
            help_url: "https://dequeuniversity.com/rules/axe/4.4/image-alt".to_string(),
            tags: vec!["wcag2a".to_string()],
            nodes: vec![ViolationNode {
                html: "<img src=\"hero.png\">".to_string(),
                target: vec!["img".to_string()],
                failure_summary: Some("Fix any of the following".to_string()),
            }],
        }],
        passes: vec![serde_json::json!({ "id": "document-title" })],
        incomplete: vec![],
        html_error_count: 2,
        html_warning_count: 1,
        html_validation_messages: vec![],
        html_validation_failed: false,
        html_validation_error: None,
        extended_checks: ExtendedChecks {
            viewport: ViewportCheck {
                blocks_zoom: false,
                user_scalable: true,
                max_scale: None,
                issues: vec![],
            },
            autoplay_media: AutoplayMediaCheck {
                has_autoplay_audio: false,
                has_autoplay_video: false,
                elements: vec![],
                issues: vec![],
            },
            tab_order: TabOrderCheck {
                has_positive_tabindex: false,
                max_tabindex: 0,
                elements_with_tabindex: vec![],
                issues: vec![],
            },
            focus_visible: FocusVisibleCheck {
                has_focus_styles: true,
                elements_without_focus: 0,
                checked_selectors: vec!["a[href]".to_string()],
                issues: vec![],
            },
            timing: TimingCheck {
                has_set_timeout: true,
                has_set_interval: false,
                refresh_meta: false,
                issues: vec![],
            },
        },
    }
}

#[test]
fn test_insert_assigns_id_and_timestamp() {
    let dir = tempdir().unwrap();
    let store = CheckStore::new(&dir.path().join("checks.db")).unwrap();

    let check = store.insert_check(&sample_result("https://example.com")).unwrap();

    assert!(!check.id.is_empty());
    assert!(chrono::DateTime::parse_from_rfc3339(&check.checked_at).is_ok());
}

#[test]
fn test_get_roundtrips_the_full_record() {
    let dir = tempdir().unwrap();
    let store = CheckStore::new(&dir.path().join("checks.db")).unwrap();

    let inserted = store.insert_check(&sample_result("https://example.com")).unwrap();
    let loaded = store.get_check(&inserted.id).unwrap().expect("check exists");

    assert_eq!(loaded.id, inserted.id);
    assert_eq!(loaded.checked_at, inserted.checked_at);
    assert_eq!(loaded.result.url, "https://example.com");
    assert_eq!(loaded.result.tested_url, "https://example.com/");
    assert_eq!(loaded.result.total_violations, 1);
    assert_eq!(loaded.result.critical_count, 1);
    assert_eq!(loaded.result.passed_count, 12);
    assert_eq!(loaded.result.violations.len(), 1);
    assert_eq!(loaded.result.violations[0].id, "image-alt");
    assert_eq!(loaded.result.violations[0].nodes.len(), 1);
    assert_eq!(loaded.result.html_error_count, 2);
    assert!(!loaded.result.html_validation_failed);
    assert!(loaded.result.extended_checks.focus_visible.has_focus_styles);
}

#[test]
fn test_validation_error_column_roundtrips() {
    let dir = tempdir().unwrap();
    let store = CheckStore::new(&dir.path().join("checks.db")).unwrap();

    let mut result = sample_result("https://example.com");
    result.html_validation_failed = true;
    result.html_validation_error = Some("Validator returned status 503".to_string());
    result.html_error_count = 0;
    result.html_warning_count = 0;

    let inserted = store.insert_check(&result).unwrap();
    let loaded = store.get_check(&inserted.id).unwrap().unwrap();

    assert!(loaded.result.html_validation_failed);
    assert_eq!(
        loaded.result.html_validation_error.as_deref(),
        Some("Validator returned status 503")
    );
}

#[test]
fn test_get_unknown_id_returns_none() {
    let dir = tempdir().unwrap();
    let store = CheckStore::new(&dir.path().join("checks.db")).unwrap();

    assert!(store.get_check("no-such-id").unwrap().is_none());
}

#[test]
fn test_list_is_most_recent_first() {
    let dir = tempdir().unwrap();
    let store = CheckStore::new(&dir.path().join("checks.db")).unwrap();

    for url in ["https://a.example", "https://b.example", "https://c.example"] {
        store.insert_check(&sample_result(url)).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    let checks = store.list_checks().unwrap();
    assert_eq!(checks.len(), 3);
    assert_eq!(checks[0].result.url, "https://c.example");
    assert_eq!(checks[2].result.url, "https://a.example");
}

#[test]
fn test_list_is_capped_at_fifty() {
    let dir = tempdir().unwrap();
    let store = CheckStore::new(&dir.path().join("checks.db")).unwrap();

    for i in 0..55 {
        store
            .insert_check(&sample_result(&format!("https://example.com/{}", i)))
            .unwrap();
    }

    assert_eq!(store.list_checks().unwrap().len(), 50);
}

#[test]
fn test_store_reopens_existing_database() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("checks.db");

    let id = {
        let store = CheckStore::new(&db_path).unwrap();
        store.insert_check(&sample_result("https://example.com")).unwrap().id
    };

    let reopened = CheckStore::new(&db_path).unwrap();
    assert!(reopened.get_check(&id).unwrap().is_some());
}
