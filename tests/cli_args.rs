//! Integration tests for CLI argument handling
//!
//! Tests argument validation and end-to-end output of the hnfeed binary.

use std::process::Command;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_hnfeed"))
        .args(args)
        .env_remove("HNFEED_BASE_URL")
        .output()
        .expect("Failed to execute hnfeed")
}

/// Helper to run the CLI without blocking the test runtime
async fn run_cli_async(args: &[&str]) -> std::process::Output {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_hnfeed"))
        .args(args)
        .env_remove("HNFEED_BASE_URL")
        .output()
        .await
        .expect("Failed to execute hnfeed")
}

async fn mount_feed(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/topstories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[11, 22, 33]"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/item/11.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id": 11, "title": "First", "url": "https://www.example.com/a", "by": "alice", "score": 10, "descendants": 2}"#,
        ))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/item/22.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/item/33.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id": 33, "title": "Third", "by": "carol", "score": 30}"#,
        ))
        .mount(server)
        .await;
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hnfeed"), "Help should mention hnfeed");
    assert!(stdout.contains("--page-size"), "Help should mention --page-size flag");
    assert!(stdout.contains("--watch"), "Help should mention --watch flag");
}

#[test]
fn test_invalid_page_size_prints_error_and_exits() {
    let output = run_cli(&["--page-size", "0"]);
    assert!(!output.status.success(), "Expected page size 0 to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid page size"),
        "Should print error message about page size: {}",
        stderr
    );
}

#[test]
fn test_invalid_base_url_prints_error_and_exits() {
    let output = run_cli(&["--base-url", "ftp://example.com"]);
    assert!(!output.status.success(), "Expected ftp base URL to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid base URL"), "Unexpected stderr: {}", stderr);
}

#[test]
fn test_non_numeric_page_is_rejected_by_parser() {
    let output = run_cli(&["--page", "first"]);
    assert!(!output.status.success());
}

#[tokio::test]
async fn test_json_output_skips_absent_items() {
    let server = MockServer::start().await;
    mount_feed(&server).await;

    let output = run_cli_async(&["--base-url", &server.uri(), "--json"]).await;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Stdout should be JSON");
    assert_eq!(json["totalCount"], 2);
    assert_eq!(json["items"][0]["id"], 11);
    assert_eq!(json["items"][1]["id"], 33);
}

#[tokio::test]
async fn test_text_output_pages_results() {
    let server = MockServer::start().await;
    mount_feed(&server).await;

    let output = run_cli_async(&[
        "--base-url",
        &server.uri(),
        "--page",
        "1",
        "--page-size",
        "1",
    ])
    .await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("  2. Third"), "Unexpected stdout: {}", stdout);
    assert!(!stdout.contains("First"));
    assert!(stdout.contains("Page 1 | 2 stories total"));
}

#[tokio::test]
async fn test_unreachable_upstream_prints_empty_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let output = run_cli_async(&["--base-url", &server.uri(), "--json"]).await;

    assert!(output.status.success(), "Upstream failure should not be fatal");
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Stdout should be JSON");
    assert_eq!(json["totalCount"], 0);
    assert_eq!(json["items"].as_array().map(Vec::len), Some(0));
}
