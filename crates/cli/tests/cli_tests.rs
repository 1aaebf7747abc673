//! CLI integration tests

use std::process::Command;

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "predict-cli", "--"])
        .args(args)
        .env_remove("CLARIFAI_PAT")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = run_cli(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("hosted model predictions"), "Should show about text");
    assert!(stdout.contains("run"), "Should show run command");
    assert!(stdout.contains("models"), "Should show models command");
    assert!(stdout.contains("--pat"), "Should show pat option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = run_cli(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("predict"), "Should show binary name");
}

/// Test run subcommand help
#[test]
fn test_run_help() {
    let output = run_cli(&["run", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Run help should succeed");
    for flag in [
        "--url",
        "--file",
        "--text",
        "--input-type",
        "--prompt",
        "--max-concepts",
        "--min-value",
        "--select-concept",
        "--sample-ms",
        "--param",
        "--timeout",
        "--output",
    ] {
        assert!(stdout.contains(flag), "Should show {} option", flag);
    }
}

/// Test models list subcommand help
#[test]
fn test_models_list_help() {
    let output = run_cli(&["models", "list", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Models list help should succeed");
    assert!(stdout.contains("--query"), "Should show query option");
    assert!(stdout.contains("--model-type"), "Should show model-type option");
    assert!(stdout.contains("--per-page"), "Should show per-page option");
}

/// Test models show subcommand help
#[test]
fn test_models_show_help() {
    let output = run_cli(&["models", "show", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Models show help should succeed");
    assert!(stdout.contains("<MODEL>"), "Should show model argument");
}

/// Test that run requires a payload source
#[test]
fn test_run_requires_payload() {
    let output = run_cli(&["run", "clarifai/main/general-image-recognition"]);

    assert!(!output.status.success(), "Run without payload should fail");
}

/// Test that a missing token is reported
#[test]
fn test_missing_pat() {
    let output = run_cli(&[
        "run",
        "clarifai/main/general-image-recognition",
        "--url",
        "https://samples.clarifai.com/metro-north.jpg",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Run without a token should fail");
    assert!(stderr.contains("personal access token"), "Should explain the missing token");
}

/// Test that verbose mode logs the resolved client configuration
#[test]
fn test_verbose_logs_client_config() {
    // Nothing listens on port 1, so the command itself fails
    let output = run_cli(&[
        "--verbose",
        "--pat",
        "test-pat",
        "--api-url",
        "http://127.0.0.1:1",
        "models",
        "list",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Unreachable API should fail");
    assert!(stderr.contains("Client configured"), "Should log the client config");
    assert!(stderr.contains("http://127.0.0.1:1"), "Should log the API base");
    assert!(!stderr.contains("test-pat"), "Should not log the token");
}
