//! CLI tests against a mock 10bis API.
//!
//! Every test runs the built binary in its own temporary directory with
//! store and notifier variables removed from the environment.

mod common;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

const REFRESH_PATH: &str = "/api/v1/Authentication/RefreshToken";
const LOAD_PATH: &str = "/api/v1/Payments/LoadTenbisCredit";
const EVERY_DAY: &str = "mon,tue,wed,thu,fri,sat,sun";

fn full_config() -> serde_json::Value {
    json!({
        "AccessToken": "access-token-0123456789",
        "RefreshToken": "refresh-token-0123456789",
        "Amount": "100",
        "MoneycardId": "777"
    })
}

#[test]
fn blocked_day_skips_without_network() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), full_config());

    // Nothing listens on port 9; any request would fail the run.
    let output = run_cli_in(
        dir.path(),
        &[
            "load-credit",
            "--blocked-days",
            EVERY_DAY,
            "--api-base",
            "http://127.0.0.1:9",
            "--max-attempts",
            "1",
        ],
        &[("NO_COLOR", "1")],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Skipped"));
    assert_eq!(read_json(&config), full_config());
    assert!(!dir.path().join("config.json.backup").exists());
}

#[test]
fn check_reports_missing_fields() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), json!({ "AccessToken": "a", "Amount": "100" }));

    let output = run_cli_in(dir.path(), &["load-credit", "--check"], &[("NO_COLOR", "1")]);

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("AccessToken: present"));
    assert!(out.contains("Amount: 100"));
    assert!(out.contains("MoneycardId: missing"));
    assert!(stderr(&output).contains("RefreshToken, MoneycardId"));
}

#[test]
fn check_passes_with_complete_config() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), full_config());

    let output = run_cli_in(dir.path(), &["load-credit", "--check"], &[("NO_COLOR", "1")]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Configuration is valid"));
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();

    let output = run_cli_in(
        dir.path(),
        &["refresh-token", "--api-base", "http://127.0.0.1:9"],
        &[("NO_COLOR", "1")],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no configuration found"));
}

#[test]
fn status_masks_tokens() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), full_config());

    let output = run_cli_in(dir.path(), &["status"], &[("NO_COLOR", "1")]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("acce...6789 (length: 23)"));
    assert!(!out.contains("access-token-0123456789"));
    assert!(out.contains("MoneycardId: 777"));
    assert!(out.contains("TeamsWebhookUrl: missing"));
}

#[tokio::test]
async fn refresh_persists_header_tokens_with_backup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(body_json(json!({ "refreshToken": "refresh-token-0123456789" })))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "Authorization=new-access; Path=/")
                .append_header("Set-Cookie", "RefreshToken=new-refresh; HttpOnly")
                .set_body_json(json!({ "AccessToken": "body-access" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), full_config());

    let output = run_cli_async(
        dir.path(),
        &["refresh-token", "--api-base", &server.uri()],
        &[("NO_COLOR", "1")],
    )
    .await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let saved = read_json(&config);
    assert_eq!(saved["AccessToken"], "new-access");
    assert_eq!(saved["RefreshToken"], "new-refresh");
    assert_eq!(saved["MoneycardId"], "777");
    assert_eq!(read_json(&dir.path().join("config.json.backup")), full_config());
    assert!(dir.path().join("logs").join("refresh.log").exists());
}

#[tokio::test]
async fn unauthorized_load_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(LOAD_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), full_config());

    let output = run_cli_async(
        dir.path(),
        &["load-credit", "--blocked-days", "", "--api-base", &server.uri()],
        &[("NO_COLOR", "1")],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("HTTP 401"));
    assert_eq!(read_json(&config), full_config());
}

#[tokio::test]
async fn actions_runner_reads_env_and_writes_outputs() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(LOAD_PATH))
        .and(header("authorization", "Bearer env-access"))
        .and(body_json(json!({ "amount": "150", "moneycardIdToCharge": "42" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let outputs = dir.path().join("github_output");
    let outputs_str = outputs.to_string_lossy().to_string();

    let output = run_cli_async(
        dir.path(),
        &["load-credit", "--blocked-days", "", "--api-base", &server.uri()],
        &[
            ("NO_COLOR", "1"),
            ("GITHUB_ACTIONS", "true"),
            ("GITHUB_OUTPUT", &outputs_str),
            ("ACCESS_TOKEN", "env-access"),
            ("REFRESH_TOKEN", "env-refresh"),
            ("AMOUNT", "150"),
            ("MONEYCARD_ID", "42"),
        ],
    )
    .await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let written = std::fs::read_to_string(&outputs).unwrap();
    assert!(written.contains("credit_loaded=success\n"));
    assert!(written.contains("amount_loaded=150\n"));
    assert!(!dir.path().join("config.json").exists());
}

#[tokio::test]
async fn empty_load_response_reports_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(LOAD_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let outputs = dir.path().join("github_output");
    let outputs_str = outputs.to_string_lossy().to_string();

    let output = run_cli_async(
        dir.path(),
        &["load-credit", "--blocked-days", "", "--api-base", &server.uri()],
        &[
            ("NO_COLOR", "1"),
            ("GITHUB_ACTIONS", "true"),
            ("GITHUB_OUTPUT", &outputs_str),
            ("ACCESS_TOKEN", "env-access"),
            ("REFRESH_TOKEN", "env-refresh"),
            ("AMOUNT", "150"),
            ("MONEYCARD_ID", "42"),
        ],
    )
    .await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let written = std::fs::read_to_string(&outputs).unwrap();
    assert!(written.contains("credit_loaded=no_response_data\n"));
    assert!(!written.contains("credit_loaded=success"));
    let out = stdout(&output);
    assert!(out.contains("::add-mask::env-access"));
    assert!(out.contains("::add-mask::env-refresh"));
}

#[tokio::test]
async fn notify_test_sends_both_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let hook = format!("{}/hook", server.uri());

    let output = run_cli_async(
        dir.path(),
        &["notify-test"],
        &[("NO_COLOR", "1"), ("TEAMS_WEBHOOK_URL", &hook)],
    )
    .await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Sent success notification"));
    assert!(out.contains("Sent failure notification"));
}

#[test]
fn notify_test_without_notifier_fails() {
    let dir = TempDir::new().unwrap();

    let output = run_cli_in(dir.path(), &["notify-test"], &[("NO_COLOR", "1")]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No Teams notifier configured"));
}
