use anyhow::Result;

use crate::util::{git_succeeds, run_git};

pub fn current_branch(repo: &str) -> Result<Option<String>> {
  let out = run_git(repo, &["rev-parse".into(), "--abbrev-ref".into(), "HEAD".into()])?;
  let name = out.trim();
  if name == "HEAD" { Ok(None) } else { Ok(Some(name.to_string())) }
}

/// Configure the committer identity the CI bot commits under.
pub fn ensure_bot_identity(repo: &str) -> Result<()> {
  run_git(repo, &["config".into(), "user.name".into(), "github-actions[bot]".into()])?;
  run_git(
    repo,
    &[
      "config".into(),
      "user.email".into(),
      "github-actions[bot]@users.noreply.github.com".into(),
    ],
  )?;
  Ok(())
}

/// Fetch `branch` from origin into a same-named local branch.
/// Failure means the branch does not exist remotely (or cannot fast-forward).
pub fn fetch_branch(repo: &str, branch: &str) -> bool {
  git_succeeds(
    repo,
    &["fetch".into(), "origin".into(), format!("{}:{}", branch, branch)],
  )
}

pub fn local_branch_exists(repo: &str, branch: &str) -> bool {
  git_succeeds(
    repo,
    &["show-ref".into(), "--verify".into(), "--quiet".into(), format!("refs/heads/{}", branch)],
  )
}

pub fn checkout(repo: &str, branch: &str) -> Result<()> {
  run_git(repo, &["checkout".into(), "-q".into(), branch.into()])?;
  Ok(())
}

/// Forced checkout. Needed to return from an orphan-created branch, where
/// the prior branch's files linger untracked and block a plain checkout.
pub fn checkout_force(repo: &str, branch: &str) -> Result<()> {
  run_git(repo, &["checkout".into(), "-q".into(), "-f".into(), branch.into()])?;
  Ok(())
}

/// Create `branch` with no history and switch to it. The inherited index is
/// cleared so the first commit carries only what gets staged afterwards.
pub fn checkout_orphan(repo: &str, branch: &str) -> Result<()> {
  run_git(repo, &["checkout".into(), "-q".into(), "--orphan".into(), branch.into()])?;
  // Fails when the index is already empty; that is the state we want.
  let _ = git_succeeds(
    repo,
    &["rm".into(), "-r".into(), "-f".into(), "-q".into(), "--cached".into(), ".".into()],
  );
  Ok(())
}

pub fn stage(repo: &str, path: &str) -> Result<()> {
  run_git(repo, &["add".into(), "--".into(), path.into()])?;
  Ok(())
}

/// Whether `path` has staged changes relative to HEAD (or at all, on an
/// unborn branch). `git diff --cached --quiet` exits non-zero on changes.
pub fn staged_changes(repo: &str, path: &str) -> bool {
  !git_succeeds(
    repo,
    &["diff".into(), "--cached".into(), "--quiet".into(), "--".into(), path.into()],
  )
}

pub fn commit(repo: &str, message: &str) -> Result<()> {
  run_git(repo, &["commit".into(), "-q".into(), "-m".into(), message.into()])?;
  Ok(())
}

pub fn push(repo: &str, branch: &str, force: bool) -> Result<()> {
  let mut args: Vec<String> = vec!["push".into(), "-q".into(), "origin".into(), branch.into()];
  if force {
    args.insert(1, "--force".into());
  }
  run_git(repo, &args)?;
  Ok(())
}
