//! CLI integration tests.
//!
//! Exercises the stage subcommands end-to-end. Stages that would reach the
//! network or the toolchain are stopped earlier by construction: a bad
//! reference fails parsing, and a missing state index fails restore, both
//! before any external call.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Get the binary to test, detached from any ambient CI environment.
fn revgate() -> Command {
    let mut cmd = Command::cargo_bin("revgate").unwrap();
    for var in ["GITHUB_REPOSITORY", "GITHUB_REF", "GITHUB_STATE", "INPUT_TOKEN", "INPUT_RELEASE"] {
        cmd.env_remove(var);
    }
    cmd.env_remove("STATE_keys");
    cmd
}

#[test]
fn test_help_flag() {
    revgate()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("CI gate for classroom code review requests"));
}

#[test]
fn test_version_flag() {
    revgate()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_setup_help_lists_inputs() {
    revgate()
        .args(["setup", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--token").and(predicate::str::contains("--release")));
}

#[test]
fn test_setup_requires_token() {
    revgate().arg("setup").assert().failure().stderr(predicate::str::contains("--token"));
}

#[test]
fn test_setup_outside_pipeline_fails() {
    revgate()
        .args(["setup", "--token", "x"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("::error::Setup failed."))
        .stdout(predicate::str::contains("GITHUB_REPOSITORY"));
}

#[test]
fn test_setup_rejects_branch_reference() {
    let temp = assert_fs::TempDir::new().unwrap();
    let state = temp.child("state");
    state.touch().unwrap();

    revgate()
        .args(["setup", "--token", "x"])
        .env("GITHUB_REPOSITORY", "octocat/project-octocat")
        .env("GITHUB_REF", "refs/heads/main")
        .env("GITHUB_STATE", state.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unable to parse project information"))
        .stdout(predicate::str::contains("::error::Setup failed."));
}

#[test]
fn test_setup_logs_state_snapshot_on_failure() {
    revgate()
        .args(["setup", "--token", "x"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("::group::Logging setup status..."))
        .stdout(predicate::str::contains("states: {"));
}

#[test]
fn test_request_without_saved_state_fails() {
    revgate()
        .arg("request")
        .assert()
        .failure()
        .stdout(predicate::str::contains("::error::Code review request failed."))
        .stdout(predicate::str::contains("no saved state found"));
}

#[test]
fn test_cleanup_without_saved_state_fails() {
    revgate()
        .arg("cleanup")
        .assert()
        .failure()
        .stdout(predicate::str::contains("::error::Cleanup failed."))
        .stdout(predicate::str::contains("no saved state found"));
}

#[test]
fn test_cleanup_without_cache_key_completes_with_notice() {
    // A restored state with no mavenKey is not an error; the stage logs
    // that it cannot cache and completes.
    revgate()
        .arg("cleanup")
        .env("STATE_keys", r#"["owner"]"#)
        .env("STATE_owner", "octocat")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unable to cache; key not found"))
        .stdout(predicate::str::contains("::group::Logging cleanup status..."));
}

#[test]
fn test_cleanup_rejects_unknown_state_key() {
    revgate()
        .arg("cleanup")
        .env("STATE_keys", r#"["mystery"]"#)
        .env("STATE_mystery", "boo")
        .assert()
        .failure()
        .stdout(predicate::str::contains("unknown state key: mystery"));
}
