//! CLI Integration Tests
//!
//! Tests the command-line interface end-to-end. Nothing here reaches a
//! provider: every run either stops before generation or lacks credentials.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Get the binary to test, isolated from the caller's config and keys.
fn briefwright(dir: &assert_fs::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("briefwright").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .env_remove("AZURE_OPENAI_API_KEY")
        .env_remove("AZURE_OPENAI_ENDPOINT")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn answer(template: &str, label: &str, value: &str) -> String {
    let header = format!("### {label}");
    let start = template.find(&header).unwrap();
    let answer_at = start + template[start..].find("**Answer:**").unwrap();
    let line_end = answer_at + template[answer_at..].find('\n').unwrap();
    format!("{}**Answer:** {value}{}", &template[..answer_at], &template[line_end..])
}

fn template(dir: &assert_fs::TempDir) -> String {
    let output = briefwright(dir).arg("template").output().unwrap();
    String::from_utf8(output.stdout).unwrap()
}

// ============================================================================
// Help & Version Tests
// ============================================================================

#[test]
fn test_help_flag() {
    let dir = assert_fs::TempDir::new().unwrap();
    briefwright(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("project brief"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("collect"));
}

#[test]
fn test_version_flag() {
    let dir = assert_fs::TempDir::new().unwrap();
    briefwright(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_subcommand_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    briefwright(&dir).assert().failure().stderr(predicate::str::contains("Usage:"));
}

// ============================================================================
// Template Tests
// ============================================================================

#[test]
fn test_template_output() {
    let dir = assert_fs::TempDir::new().unwrap();
    briefwright(&dir)
        .arg("template")
        .assert()
        .success()
        .stdout(predicate::str::contains("## Required Information"))
        .stdout(predicate::str::contains("### App Name *"))
        .stdout(predicate::str::contains("## Optional Information"))
        .stdout(predicate::str::contains("_(optional)_"));
}

// ============================================================================
// Generate Tests
// ============================================================================

#[test]
fn test_generate_missing_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    briefwright(&dir)
        .args(["generate", "nope.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read brief"));
}

#[test]
fn test_generate_reports_missing_required_fields() {
    let dir = assert_fs::TempDir::new().unwrap();
    let md = answer(&template(&dir), "App Name", "Acme");
    let brief = dir.child("brief.md");
    brief.write_str(&md).unwrap();

    briefwright(&dir)
        .args(["generate", "brief.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required fields"))
        .stderr(predicate::str::contains("problemSolved"))
        .stderr(predicate::str::contains("coreFeatures"));
}

#[test]
fn test_generate_without_credentials() {
    let dir = assert_fs::TempDir::new().unwrap();
    let md = template(&dir);
    let md = answer(&md, "App Name", "Acme");
    let md = answer(&md, "Problem Solved", "tracks invoices");
    let md = answer(&md, "Core Features", "invoicing, reporting");
    dir.child("brief.md").write_str(&md).unwrap();

    briefwright(&dir)
        .args(["generate", "brief.md", "--output", "out.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("AZURE_OPENAI_API_KEY"));

    dir.child("out.json").assert(predicate::path::missing());
}

#[test]
fn test_generate_help_lists_cursor_rules() {
    let dir = assert_fs::TempDir::new().unwrap();
    briefwright(&dir)
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--cursor-rules"))
        .stdout(predicate::str::contains(".cursorrules"));
}

#[test]
fn test_generate_cursor_rules_without_credentials() {
    let dir = assert_fs::TempDir::new().unwrap();
    let md = template(&dir);
    let md = answer(&md, "App Name", "Acme");
    let md = answer(&md, "Problem Solved", "tracks invoices");
    let md = answer(&md, "Core Features", "invoicing, reporting");
    dir.child("brief.md").write_str(&md).unwrap();

    briefwright(&dir)
        .args(["generate", "brief.md", "--cursor-rules", ".cursorrules"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("AZURE_OPENAI_API_KEY"));

    dir.child(".cursorrules").assert(predicate::path::missing());
}

#[test]
fn test_collect_without_credentials() {
    let dir = assert_fs::TempDir::new().unwrap();
    briefwright(&dir)
        .arg("collect")
        .write_stdin("/quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not set"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_shows_defaults() {
    let dir = assert_fs::TempDir::new().unwrap();
    briefwright(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[session]"))
        .stdout(predicate::str::contains("max_retries = 3"))
        .stdout(predicate::str::contains("[orchestrator]"))
        .stdout(predicate::str::contains("cursor_rules = false"));
}

#[test]
fn test_config_reads_local_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child(".briefwright.toml").write_str("[orchestrator]\nattempts = 4\n").unwrap();

    briefwright(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("attempts = 4"));
}

#[test]
fn test_config_path() {
    let dir = assert_fs::TempDir::new().unwrap();
    briefwright(&dir)
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("briefwright"));
}

// ============================================================================
// Completions Tests
// ============================================================================

#[test]
fn test_completions_bash() {
    let dir = assert_fs::TempDir::new().unwrap();
    briefwright(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("briefwright"));
}
