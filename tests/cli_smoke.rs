//! CLI smoke tests: verify the commands that work without an API key.
//!
//! These tests run the compiled binary and verify exit codes and output.
//! No external API keys or network access required.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use tempfile::NamedTempFile;

/// Helper: run premiumbot with given args and return (exit_code, stdout, stderr).
fn run_cli(args: &[&str]) -> (i32, String, String) {
    let bin = env!("CARGO_BIN_EXE_premiumbot");
    let output = Command::new(bin)
        .args(args)
        .env("RUST_LOG", "") // suppress tracing noise
        .env_remove("OPENAI_API_KEY")
        .env_remove("PREMIUMBOT_PROVIDERS_OPENAI_API_KEY")
        .output()
        .expect("failed to execute premiumbot binary");
    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

fn sample_table() -> String {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "data", "premium.sample.json"]
        .iter()
        .collect();
    path.display().to_string()
}

fn config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

// ============================================================================
// Help & Version
// ============================================================================

#[test]
fn cli_no_args_shows_help() {
    let (code, stdout, _stderr) = run_cli(&[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("premiumbot"));
}

#[test]
fn cli_help_lists_commands() {
    let (code, stdout, _stderr) = run_cli(&["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Commands:"));
    for command in ["serve", "chat", "lookup", "config", "version"] {
        assert!(stdout.contains(command), "missing command {}", command);
    }
}

#[test]
fn cli_version_command() {
    let (code, stdout, _stderr) = run_cli(&["version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("premiumbot"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_unknown_command_fails() {
    let (code, _stdout, stderr) = run_cli(&["nonexistent-command"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error"));
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn cli_lookup_from_sample_table() {
    let table = sample_table();
    let (code, stdout, stderr) = run_cli(&[
        "lookup", "--age", "30", "--cancer", "Lung Cancer", "--gender", "Male", "--table", &table,
    ]);
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("**Early Stage**: The Premium plan is IDR 1,320,000"));
    assert!(stdout.contains("Major Stage"));
    assert!(stdout.contains("Advanced Stage"));
}

#[test]
fn cli_lookup_option_and_age_bracket() {
    let table = sample_table();
    let (code, stdout, _stderr) = run_cli(&[
        "lookup", "--age", "34", "--cancer", "lung cancer", "--gender", "male", "--option", "C",
        "--table", &table,
    ]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Basic plan is IDR 594,000"));
}

#[test]
fn cli_lookup_unsupported_gender_is_not_an_error() {
    let table = sample_table();
    let (code, stdout, _stderr) = run_cli(&[
        "lookup", "--age", "30", "--cancer", "Lung Cancer", "--gender", "Other", "--table", &table,
    ]);
    assert_eq!(code, 0);
    assert!(stdout.contains("male or female"));
}

#[test]
fn cli_lookup_missing_table_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    let (code, _stdout, stderr) = run_cli(&[
        "lookup",
        "--age",
        "30",
        "--cancer",
        "Lung Cancer",
        "--gender",
        "Male",
        "--table",
        &missing.display().to_string(),
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Failed to load premium table"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn cli_config_check_reports_unknown_field() {
    let file = config_file(r#"{"gateway": {"prot": 9000}}"#);
    let path = file.path().display().to_string();
    let (code, stdout, _stderr) = run_cli(&["config", "check", "--config", &path]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Config file:"));
    assert!(stdout.contains("Unknown field 'prot'"));
    assert!(stdout.contains("did you mean 'port'?"));
}

#[test]
fn cli_config_check_flags_missing_api_key() {
    let file = config_file("{}");
    let path = file.path().display().to_string();
    let (code, stdout, _stderr) = run_cli(&["config", "check", "--config", &path]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[ERROR]"));
    assert!(stdout.contains("error(s)"));
}

#[test]
fn cli_config_check_invalid_json() {
    let file = config_file("{not json");
    let path = file.path().display().to_string();
    let (code, stdout, _stderr) = run_cli(&["config", "check", "--config", &path]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[ERROR] Invalid JSON"));
}

#[test]
fn cli_config_check_help() {
    let (code, stdout, _stderr) = run_cli(&["config", "check", "--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Check"));
}

// ============================================================================
// Commands that need a model
// ============================================================================

#[test]
fn cli_serve_without_api_key_fails() {
    let file = config_file(r#"{"gateway": {"port": 0}}"#);
    let path = file.path().display().to_string();
    let (code, _stdout, stderr) = run_cli(&["serve", "--config", &path]);
    assert_ne!(code, 0);
    assert!(stderr.to_lowercase().contains("api key"));
}
