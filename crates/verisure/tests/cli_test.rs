//! Integration tests for the `verisure` CLI binary.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// `verisure` with env isolation: no `VERISURE_*` variables and config
/// directories pointed at a path that does not exist.
fn verisure_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("verisure");
    cmd.env("HOME", "/tmp/verisure-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/verisure-cli-test-nonexistent")
        .env_remove("VERISURE_EMAIL")
        .env_remove("VERISURE_PASSWORD")
        .env_remove("VERISURE_ALARM_CODE")
        .env_remove("VERISURE_DOOR_CODE")
        .env_remove("VERISURE_BASE_URL")
        .env_remove("VERISURE_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// A mock account with one installation holding a single smart plug.
async fn mock_account() -> MockServer {
    mock_account_with(json!({
        "smartPlugs": [
            { "deviceLabel": "P1", "area": "Kitchen", "currentState": "OFF" }
        ]
    }))
    .await
}

async fn mock_account_with(overview: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cookie": "tok" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/installation/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "giid": "111", "street": "Storgatan 1" }])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/installation/111/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(overview))
        .mount(&server)
        .await;
    server
}

fn account_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = verisure_cmd();
    cmd.env("VERISURE_BASE_URL", server.uri())
        .env("VERISURE_EMAIL", "owner@example.com")
        .env("VERISURE_PASSWORD", "hunter2");
    cmd
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = verisure_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    verisure_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Verisure")
            .and(predicate::str::contains("accessories"))
            .and(predicate::str::contains("set")),
    );
}

#[test]
fn test_version_flag() {
    verisure_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("verisure"));
}

#[test]
fn test_completions_bash() {
    verisure_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_output_format() {
    let output = verisure_cmd()
        .args(["accessories", "--output", "yaml"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_set_requires_value() {
    let output = verisure_cmd().args(["set", "Entré"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_default() {
    verisure_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_path_override() {
    verisure_cmd()
        .args(["--config", "/tmp/custom-verisure.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/custom-verisure.toml"));
}

#[test]
fn test_accessories_without_email_is_auth_error() {
    let output = verisure_cmd().arg("accessories").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("email"), "Expected hint about email:\n{text}");
}

#[test]
fn test_invalid_base_url_is_usage_error() {
    let output = verisure_cmd()
        .env("VERISURE_EMAIL", "owner@example.com")
        .env("VERISURE_PASSWORD", "hunter2")
        .env("VERISURE_BASE_URL", "not a url")
        .arg("accessories")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Against a mock account ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_accessories_json() {
    let server = mock_account().await;
    let mut cmd = account_cmd(&server);

    let output = tokio::task::spawn_blocking(move || {
        cmd.args(["accessories", "--output", "json"]).output().unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed[0]["name"], "Smart plug (Kitchen)");
    assert_eq!(listed[0]["installation"], "Storgatan 1");
    assert_eq!(listed[0]["current"], json!({ "kind": "switch", "value": false }));
    assert!(listed[0].get("reported_at").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_accessories_json_includes_reading_time() {
    let server = mock_account_with(json!({
        "climateValues": [{
            "deviceLabel": "HUM1", "deviceArea": "Bad", "deviceType": "HUMIDITY1",
            "temperature": 23.0, "time": "2024-03-01T18:00:00.000Z"
        }]
    }))
    .await;
    let mut cmd = account_cmd(&server);

    let output = tokio::task::spawn_blocking(move || {
        cmd.args(["accessories", "--output", "json"]).output().unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed[0]["name"], "Klimatdetektor (Bad)");
    assert_eq!(listed[0]["reported_at"], "2024-03-01T18:00:00Z");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_plug_on() {
    let server = mock_account().await;
    Mock::given(method("POST"))
        .and(path("/installation/111/smartplug/state"))
        .and(body_json(json!([{ "deviceLabel": "P1", "state": true }])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let mut cmd = account_cmd(&server);

    let output = tokio::task::spawn_blocking(move || {
        cmd.args(["set", "smart plug (kitchen)", "on"]).output().unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Smart plug (Kitchen): on"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_unknown_accessory_is_not_found() {
    let server = mock_account().await;
    let mut cmd = account_cmd(&server);

    let output = tokio::task::spawn_blocking(move || cmd.args(["get", "Garage"]).output().unwrap())
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}
