//! Schema and run commands end to end.

use std::io::Write;

use crate::common::{Plugin, stdout_json};

#[test]
fn schema_lists_wait_step() {
    let plugin = Plugin::new();
    let output = plugin.command().arg("schema").output().unwrap();
    assert!(output.status.success());

    let schema = stdout_json(&output);
    let wait = &schema["steps"]["wait"];
    assert_eq!(wait["id"], "wait");
    assert_eq!(wait["name"], "Wait");
    assert_eq!(wait["input"]["required"][0], "seconds");
    assert!(wait["outputs"]["success"].is_object());
    assert!(wait["outputs"]["cancelled"].is_object());
}

#[test]
fn run_from_stdin_succeeds() {
    let plugin = Plugin::new();
    let output = plugin.run_with_stdin(&["run"], r#"{"seconds": 0.1}"#);
    assert!(output.status.success());

    let doc = stdout_json(&output);
    assert_eq!(doc["output_id"], "success");
    let actual = doc["output_data"]["actual_wait_seconds"].as_f64().unwrap();
    assert!(actual >= 0.1, "actual = {actual}");
    assert!(actual < 1.0, "actual = {actual}");
    let message = doc["output_data"]["message"].as_str().unwrap();
    assert!(message.starts_with("Waited "));
    assert!(message.ends_with("scheduled to wait for 0.1 seconds."));
}

#[test]
fn zero_seconds_succeeds_immediately() {
    let plugin = Plugin::new();
    let output = plugin.run_with_stdin(&["run", "--step", "wait"], r#"{"seconds": 0}"#);
    assert!(output.status.success());

    let doc = stdout_json(&output);
    assert_eq!(doc["output_id"], "success");
    let actual = doc["output_data"]["actual_wait_seconds"].as_f64().unwrap();
    assert!(actual < 0.1, "actual = {actual}");
}

#[test]
fn run_from_toml_file() {
    let plugin = Plugin::new();
    let mut input = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(input, "seconds = 0.05").unwrap();

    let output = plugin
        .command()
        .args(["run", "--file"])
        .arg(input.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["output_id"], "success");
}

#[test]
fn negative_seconds_is_rejected() {
    let plugin = Plugin::new();
    let output = plugin.run_with_stdin(&["run"], r#"{"seconds": -1}"#);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Bad step input"), "stderr: {stderr}");
}

#[test]
fn unknown_step_is_rejected() {
    let plugin = Plugin::new();
    let output = plugin.run_with_stdin(&["run", "--step", "sleep"], r#"{"seconds": 0}"#);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown step: sleep"), "stderr: {stderr}");
}

#[test]
fn invalid_config_is_reported() {
    let plugin = Plugin::with_config("[cancellation]\nsignals = [\"KILL\"]\n");
    let output = plugin.command().arg("schema").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse config"), "stderr: {stderr}");
}

#[test]
fn invalid_log_filter_is_reported_after_logging_starts() {
    let plugin = Plugin::with_config("[logging]\nfilter = \"waitstep=loudest\"\n");
    let output = plugin
        .command()
        .env_remove("RUST_LOG")
        .arg("schema")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Ignoring invalid logging.filter"), "stderr: {stderr}");
}

#[test]
fn loaded_config_path_is_logged() {
    let plugin = Plugin::new();
    let output = plugin.command().arg("schema").output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Loaded config"), "stderr: {stderr}");
}

#[test]
fn missing_config_named_by_env_is_an_error() {
    let plugin = Plugin::new();
    let dir = tempfile::tempdir().unwrap();
    let output = plugin
        .command()
        .env("WAITSTEP_CONFIG", dir.path().join("absent.toml"))
        .arg("schema")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read config"), "stderr: {stderr}");
}
