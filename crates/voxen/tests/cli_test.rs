//! Integration tests for the `voxen` CLI binary.
//!
//! Argument parsing, help output, completions and error exit codes run
//! without a backend; command flows run against a wiremock bridge.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `voxen` binary with env isolation.
///
/// Clears `VOXEN_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn voxen_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("voxen");
    cmd.env("HOME", "/tmp/voxen-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/voxen-cli-test-nonexistent")
        .env_remove("VOXEN_LOG")
        .env_remove("VOXEN_OUTPUT")
        .env_remove("VOXEN_BACKEND__URL")
        .env_remove("VOXEN_BACKEND__TIMEOUT")
        .env_remove("VOXEN_DEFAULTS__OUTPUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn invoke(command: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(path(format!("/invoke/{command}")))
}

fn history_fixture() -> serde_json::Value {
    json!([
        {
            "id": "run-1",
            "timestamp": "2025-03-01T09:00:00Z",
            "instruction": "make it formal",
            "original_content": "hey can u send the report",
            "enriched_content": "Could you please send the report?"
        },
        {
            "id": "run-2",
            "timestamp": "2025-03-01T09:05:00Z",
            "instruction": "bullet points",
            "original_content": "milk eggs bread",
            "enriched_content": "- Milk\n- Eggs\n- Bread"
        }
    ])
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = voxen_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    voxen_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("voice-capture")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("history"))
            .and(predicate::str::contains("settings"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    voxen_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("voxen"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    voxen_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    voxen_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Parse errors ────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = voxen_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = voxen_cmd()
        .args(["--output", "invalid", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("possible values") || text.contains("invalid"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_recording_timeout_out_of_range() {
    let output = voxen_cmd()
        .args(["settings", "set", "--recording-timeout", "90"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_settings_set_requires_a_change() {
    let output = voxen_cmd().args(["settings", "set"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    // Falls back to defaults when no file exists.
    voxen_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:7878"));
}

#[test]
fn test_config_path() {
    voxen_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_subcommands_exist() {
    voxen_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("path")),
        );
}

// ── Backend errors ──────────────────────────────────────────────────

#[test]
fn test_unreachable_backend_exits_with_connection_code() {
    let output = voxen_cmd()
        .args(["--backend", "http://127.0.0.1:9", "--timeout", "2", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

#[test]
fn test_non_http_backend_is_a_usage_error() {
    let output = voxen_cmd()
        .args(["--backend", "ftp://example.com", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Flows against a mock bridge ─────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_json() {
    let server = MockServer::start().await;
    invoke("get_status")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("processing")))
        .mount(&server)
        .await;

    let output = voxen_cmd()
        .args(["--backend", &server.uri(), "--output", "json", "status"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["status"], "processing");
    assert_eq!(body["label"], "Processing");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_trigger_while_processing_sends_nothing() {
    let server = MockServer::start().await;
    invoke("get_status")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("processing")))
        .mount(&server)
        .await;
    invoke("manual_trigger")
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = voxen_cmd()
        .args(["--backend", &server.uri(), "trigger"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(6), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_trigger_from_idle() {
    let server = MockServer::start().await;
    invoke("get_status")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("idle")))
        .mount(&server)
        .await;
    invoke("manual_trigger")
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    voxen_cmd()
        .args(["--backend", &server.uri(), "trigger"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Advance requested"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_history_list_is_most_recent_first() {
    let server = MockServer::start().await;
    invoke("get_history")
        .respond_with(ResponseTemplate::new(200).set_body_json(history_fixture()))
        .mount(&server)
        .await;

    voxen_cmd()
        .args(["--backend", &server.uri(), "--output", "plain", "history", "list"])
        .assert()
        .success()
        .stdout("run-2\nrun-1\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_history_show_unknown_id() {
    let server = MockServer::start().await;
    invoke("get_history")
        .respond_with(ResponseTemplate::new(200).set_body_json(history_fixture()))
        .mount(&server)
        .await;

    let output = voxen_cmd()
        .args(["--backend", &server.uri(), "history", "show", "nope"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_history_delete_needs_yes_without_terminal() {
    let server = MockServer::start().await;
    invoke("get_history")
        .respond_with(ResponseTemplate::new(200).set_body_json(history_fixture()))
        .mount(&server)
        .await;
    invoke("delete_history_item")
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = voxen_cmd()
        .args(["--backend", &server.uri(), "history", "delete", "run-1"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_history_delete_rejected() {
    let server = MockServer::start().await;
    invoke("get_history")
        .respond_with(ResponseTemplate::new(200).set_body_json(history_fixture()))
        .mount(&server)
        .await;
    invoke("delete_history_item")
        .and(body_json(json!({"id": "run-1"})))
        .respond_with(ResponseTemplate::new(500).set_body_string("history file locked"))
        .expect(1)
        .mount(&server)
        .await;

    let output = voxen_cmd()
        .args(["--backend", &server.uri(), "-y", "history", "delete", "run-1"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("history file locked"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_settings_set_saves_draft() {
    let server = MockServer::start().await;
    invoke("get_settings")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gemma:4b",
            "microphone": "default",
            "hotkey": "Ctrl+I",
            "recording_timeout_minutes": 10
        })))
        .mount(&server)
        .await;
    invoke("save_settings")
        .and(body_json(json!({
            "settings": {
                "model": "llama3",
                "microphone": "default",
                "hotkey": "Ctrl+I",
                "recording_timeout_minutes": 15
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    voxen_cmd()
        .args([
            "--backend",
            &server.uri(),
            "--output",
            "plain",
            "settings",
            "set",
            "--model",
            "llama3",
            "--recording-timeout",
            "15",
        ])
        .assert()
        .success()
        .stdout("llama3\n")
        .stderr(predicate::str::contains("model: gemma:4b -> llama3"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_settings_set_dry_run_sends_nothing() {
    let server = MockServer::start().await;
    invoke("get_settings")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gemma3:4b",
            "microphone": "default",
            "hotkey": "Ctrl+I"
        })))
        .mount(&server)
        .await;
    invoke("save_settings")
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    voxen_cmd()
        .args([
            "--backend",
            &server.uri(),
            "settings",
            "set",
            "--hotkey",
            "Ctrl+Shift+V",
            "--dry-run",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("hotkey: Ctrl+I -> Ctrl+Shift+V"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_models_marks_selection() {
    let server = MockServer::start().await;
    invoke("get_models")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["gemma3:4b", "llama3"])))
        .mount(&server)
        .await;
    invoke("get_settings")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3",
            "microphone": "default",
            "hotkey": "Ctrl+I",
            "recording_timeout_minutes": 10
        })))
        .mount(&server)
        .await;

    voxen_cmd()
        .args(["--backend", &server.uri(), "--color", "never", "models"])
        .assert()
        .success()
        .stdout(predicate::str::contains("llama3").and(predicate::str::contains("In use")));
}
