use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tempfile::TempDir;
use tower::util::ServiceExt;

use wcag_auditor::config::AuditorConfig;
use wcag_auditor::report::{
    AnalysisResult, AutoplayMediaCheck, ExtendedChecks, FocusVisibleCheck, TabOrderCheck,
    TimingCheck, ViewportCheck, ViolationDetail,
};
use wcag_auditor::server::build_router;
use wcag_auditor::state::{AppState, SharedState};

fn make_state(dir: &TempDir) -> SharedState {
    let config = AuditorConfig {
        port: 0,
        chrome_endpoint: "http://127.0.0.1:9222".to_string(),
        axe_script: PathBuf::from("assets/axe.min.js"),
        validator_url: "http://127.0.0.1:1/nu".to_string(),
        db_path: dir.path().join("checks.db"),
    };
    Arc::new(AppState::new(config).expect("state builds"))
}

fn sample_result() -> AnalysisResult {
    AnalysisResult {
        url: "https://example.com".to_string(),
        tested_url: "https://example.com/".to_string(),
        page_title: "Example".to_string(),
        total_violations: 1,
        critical_count: 0,
        serious_count: 1,
        moderate_count: 0,
        minor_count: 0,
        passed_count: 3,
        violations: vec![ViolationDetail {
            id: "color-contrast".to_string(),
            impact: "serious".to_string(),
            description: String::new(),
            help: String::new(),
            help_url: String::new(),
            tags: vec![],
            nodes: vec![],
        }],
        passes: vec![],
        incomplete: vec![],
        html_error_count: 0,
        html_warning_count: 0,
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
                checked_selectors: vec![],
                issues: vec![],
            },
            timing: TimingCheck {
                has_set_timeout: false,
                has_set_interval: false,
                refresh_meta: false,
                issues: vec![],
            },
        },
    }
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_reports_ok() {
    let dir = TempDir::new().unwrap();
    let router = build_router(make_state(&dir));

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("\"status\":\"ok\""));
}

#[tokio::test]
async fn test_analyze_rejects_malformed_url_with_400() {
    let dir = TempDir::new().unwrap();
    let router = build_router(make_state(&dir));

    let response = router
        .oneshot(
            Request::post("/api/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"url": "not a url"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("Invalid URL"));
}

#[tokio::test]
async fn test_analyze_rejects_non_http_scheme_with_400() {
    let dir = TempDir::new().unwrap();
    let router = build_router(make_state(&dir));

    let response = router
        .oneshot(
            Request::post("/api/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"url": "file:///etc/passwd"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_check_is_404() {
    let dir = TempDir::new().unwrap();
    let router = build_router(make_state(&dir));

    let response = router
        .oneshot(
            Request::get("/api/checks/no-such-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_stored_check_returns_camel_case_record() {
    let dir = TempDir::new().unwrap();
    let state = make_state(&dir);
    let inserted = state.store.insert_check(&sample_result()).unwrap();
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::get(format!("/api/checks/{}", inserted.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("\"totalViolations\":1"));
    assert!(body.contains("\"extendedChecks\""));
    assert!(body.contains(&inserted.id));
}

#[tokio::test]
async fn test_summary_recomputes_categories_from_stored_violations() {
    let dir = TempDir::new().unwrap();
    let state = make_state(&dir);
    let inserted = state.store.insert_check(&sample_result()).unwrap();
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::get(format!("/api/checks/{}/summary", inserted.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Color contrast"));
    assert!(body.contains("\"severity\":\"critical\""));
    assert!(body.contains("Priority 1"));
}

#[tokio::test]
async fn test_summary_of_unknown_check_is_404() {
    let dir = TempDir::new().unwrap();
    let router = build_router(make_state(&dir));

    let response = router
        .oneshot(
            Request::get("/api/checks/nope/summary")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_lists_stored_checks_most_recent_first() {
    let dir = TempDir::new().unwrap();
    let state = make_state(&dir);

    let mut first = sample_result();
    first.url = "https://first.example".to_string();
    state.store.insert_check(&first).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));

    let mut second = sample_result();
    second.url = "https://second.example".to_string();
    state.store.insert_check(&second).unwrap();

    let router = build_router(state);
    let response = router
        .oneshot(Request::get("/api/history").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    let first_pos = body.find("https://first.example").unwrap();
    let second_pos = body.find("https://second.example").unwrap();
    assert!(second_pos < first_pos);
}

#[tokio::test]
async fn test_history_is_empty_on_fresh_store() {
    let dir = TempDir::new().unwrap();
    let router = build_router(make_state(&dir));

    let response = router
        .oneshot(Request::get("/api/history").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "[]");
}
