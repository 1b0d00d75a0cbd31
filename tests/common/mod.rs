use std::path::{Path, PathBuf};
use std::process::Command;

#[allow(dead_code)]
pub fn bin_path() -> PathBuf {
  PathBuf::from(env!("CARGO_BIN_EXE_subscribe-sync"))
}

#[allow(dead_code)]
pub fn run(repo: &Path, args: &[&str]) {
  let status = Command::new("git").args(args).current_dir(repo).status().unwrap();
  assert!(status.success(), "git {:?} failed", args);
}

/// Work repo on `main` with a local bare `origin` remote, ready to publish to.
/// Returns the owning tempdir and the work repo path inside it.
#[allow(dead_code)]
pub fn init_fixture_workdir() -> (tempfile::TempDir, PathBuf) {
  let dir = tempfile::TempDir::new().unwrap();
  let remote = dir.path().join("origin.git");
  let work = dir.path().join("work");
  std::fs::create_dir_all(&work).unwrap();

  run(dir.path(), &["init", "-q", "--bare", remote.to_str().unwrap()]);
  run(&work, &["init", "-q", "-b", "main"]);
  run(&work, &["config", "user.name", "Fixture Bot"]);
  run(&work, &["config", "user.email", "fixture@example.com"]);
  run(&work, &["config", "commit.gpgsign", "false"]);
  run(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);

  std::fs::write(work.join("README.md"), "fixture\n").unwrap();
  run(&work, &["add", "."]);
  run(&work, &["commit", "-q", "-m", "init"]);
  run(&work, &["push", "-q", "origin", "main"]);

  (dir, work)
}

/// Base command for driving the binary in tests: ambient Actions/token env
/// stripped so only what the test sets explicitly applies.
#[allow(dead_code)]
pub fn base_cmd(work: &Path) -> Command {
  let mut cmd = Command::new(bin_path());
  cmd
    .env_remove("GITHUB_TOKEN")
    .env_remove("GH_TOKEN")
    .env_remove("GITHUB_REPOSITORY")
    .env_remove("GITHUB_EVENT_PATH")
    .args(["--workdir", work.to_str().unwrap(), "--repo", "acme/widgets"]);
  cmd
}

/// Read a file out of a branch on the work repo's origin.
#[allow(dead_code)]
pub fn remote_file(work: &Path, branch: &str, rel: &str) -> String {
  run(work, &["fetch", "-q", "origin", branch]);
  let out = Command::new("git")
    .args(["show", &format!("FETCH_HEAD:{}", rel)])
    .current_dir(work)
    .output()
    .unwrap();
  assert!(out.status.success(), "git show failed: {}", String::from_utf8_lossy(&out.stderr));
  String::from_utf8_lossy(&out.stdout).to_string()
}

/// Write an issue-event payload file and return its path.
#[allow(dead_code)]
pub fn write_event(dir: &Path, issue: serde_json::Value) -> PathBuf {
  let p = dir.join("event.json");
  std::fs::write(&p, serde_json::json!({ "action": "opened", "issue": issue }).to_string()).unwrap();
  p
}
