//! CLI surface tests: argument validation and fast-failing paths that never
//! reach the network.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_describes_the_tool() {
    Command::cargo_bin("repo2doc")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("repository"));
}

#[test]
fn missing_repo_url_is_a_usage_error() {
    Command::cargo_bin("repo2doc")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("repo_url").or(predicate::str::contains("REPO_URL")));
}

#[test]
fn unsupported_host_fails_before_any_download() {
    Command::cargo_bin("repo2doc")
        .unwrap()
        .args([
            "https://bitbucket.org/acme/widget",
            "--branch-or-tag",
            "v1.0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported repository host"));
}

#[test]
fn unknown_language_is_rejected() {
    Command::cargo_bin("repo2doc")
        .unwrap()
        .args(["https://github.com/acme/widget", "--lang", "cobol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown language: cobol"));
}

#[test]
fn unreadable_config_file_is_rejected() {
    Command::cargo_bin("repo2doc")
        .unwrap()
        .args([
            "https://github.com/acme/widget",
            "--config",
            "/nonexistent/repo2doc.yml",
        ])
        .assert()
        .failure();
}
