mod common;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
  let mut c = Command::cargo_bin("subscribe-sync").unwrap();
  c.env_remove("GITHUB_TOKEN")
    .env_remove("GH_TOKEN")
    .env_remove("GITHUB_REPOSITORY")
    .env_remove("GITHUB_EVENT_PATH");
  c
}

#[test]
fn repo_resolution_failure_is_explained() {
  let td = tempfile::TempDir::new().unwrap();
  // Workdir is not a git repo and no --repo/env is given.
  cmd()
    .args(["--workdir", td.path().to_str().unwrap(), "--skip-label-sync", "--skip-publish"])
    .env("SUBSYNC_TEST_ISSUES_JSON", "[]")
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot determine target repository"));
}

#[test]
fn malformed_repo_flag_is_rejected() {
  cmd()
    .args(["--repo", "not-a-slug", "--skip-label-sync", "--skip-publish"])
    .env("SUBSYNC_TEST_ISSUES_JSON", "[]")
    .assert()
    .failure()
    .stderr(predicate::str::contains("owner/name"));
}

#[test]
fn absolute_out_path_is_rejected() {
  cmd()
    .args(["--repo", "acme/widgets", "--out", "/etc/subscribe.json", "--skip-label-sync"])
    .env("SUBSYNC_TEST_ISSUES_JSON", "[]")
    .assert()
    .failure()
    .stderr(predicate::str::contains("relative path"));
}

#[test]
fn issue_number_conflicts_with_event_path() {
  cmd()
    .args(["--repo", "acme/widgets", "--issue-number", "1", "--event-path", "/tmp/event.json"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn unknown_aggregate_mode_is_rejected_by_clap() {
  cmd()
    .args(["--repo", "acme/widgets", "--aggregate", "everything"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn missing_token_without_mock_fails_fast() {
  let (_td, work) = common::init_fixture_workdir();
  // No token, no mock fixtures: the API backend cannot be built. PATH is
  // cleared so a developer's `gh` login does not leak into the test.
  cmd()
    .args(["--workdir", work.to_str().unwrap(), "--repo", "acme/widgets"])
    .env("PATH", "/nonexistent")
    .assert()
    .failure()
    .stderr(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
fn gen_man_emits_troff() {
  cmd()
    .arg("--gen-man")
    .assert()
    .success()
    .stdout(predicate::str::contains(".TH"))
    .stdout(predicate::str::contains("subscribe-sync"));
}
