use serde_json::json;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wcag_auditor::html_validator::validate_html;
use wcag_auditor::report::MessageType;

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn test_counting_rule_errors_and_info_warnings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("content-type", "text/html; charset=utf-8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                {
                    "type": "error",
                    "message": "Stray end tag.",
                    "extract": "</div>",
                    "firstLine": 10,
                    "lastLine": 10,
                    "firstColumn": 1,
                    "lastColumn": 6,
                    "hiliteStart": 0,
                    "hiliteLength": 6
                },
                {
                    "type": "info",
                    "subType": "warning",
                    "message": "Consider adding lang."
                },
                {
                    "type": "info",
                    "message": "Trailing slash on void elements."
                }
            ]
        })))
        .mount(&server)
        .await;

    let result = validate_html(&client(), &server.uri(), "<html></html>").await;

    assert!(!result.validation_failed);
    assert_eq!(result.error_count, 1);
    assert_eq!(result.warning_count, 1);
    assert_eq!(result.messages.len(), 3);
    assert_eq!(result.messages[0].message_type, MessageType::Error);
    assert_eq!(result.messages[1].message_type, MessageType::Warning);
    assert_eq!(result.messages[2].message_type, MessageType::Info);
}

#[tokio::test]
async fn test_missing_message_fields_default_to_empty_and_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{ "type": "error" }]
        })))
        .mount(&server)
        .await;

    let result = validate_html(&client(), &server.uri(), "<html></html>").await;

    let msg = &result.messages[0];
    assert_eq!(msg.message, "");
    assert_eq!(msg.extract, "");
    assert_eq!(msg.first_line, 0);
    assert_eq!(msg.last_column, 0);
    assert_eq!(msg.hilite_length, 0);
}

#[tokio::test]
async fn test_clean_document_yields_zero_counts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messages": [] })))
        .mount(&server)
        .await;

    let result = validate_html(&client(), &server.uri(), "<!DOCTYPE html><html></html>").await;

    assert!(!result.validation_failed);
    assert_eq!(result.error_count, 0);
    assert_eq!(result.warning_count, 0);
    assert!(result.messages.is_empty());
    assert!(result.validation_error.is_none());
}

#[tokio::test]
async fn test_non_2xx_status_degrades_without_raising() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = validate_html(&client(), &server.uri(), "<html></html>").await;

    assert!(result.validation_failed);
    assert_eq!(result.error_count, 0);
    assert_eq!(result.warning_count, 0);
    assert!(result.messages.is_empty());
    assert!(result.validation_error.unwrap().contains("503"));
}

#[tokio::test]
async fn test_malformed_body_degrades_without_raising() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let result = validate_html(&client(), &server.uri(), "<html></html>").await;

    assert!(result.validation_failed);
    assert!(result.validation_error.is_some());
}

#[tokio::test]
async fn test_unreachable_endpoint_degrades_without_raising() {
    // Nothing listens on port 1.
    let result = validate_html(&client(), "http://127.0.0.1:1/nu", "<html></html>").await;

    assert!(result.validation_failed);
    assert_eq!(result.error_count, 0);
    assert!(result.messages.is_empty());
    assert!(result.validation_error.is_some());
}
