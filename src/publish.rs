use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::gitio;

/// How the output branch is obtained and pushed. The two strategies mirror
/// the push variants the deployed automation shipped over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PushStrategy {
  /// Fetch the branch from origin; create it as an orphan when absent.
  FetchOrOrphan,
  /// Same branch resolution, but push with `--force`.
  Force,
}

/// Write the artifact under `workdir/rel_path`, creating parent directories.
pub fn write_artifact(workdir: &str, rel_path: &str, bytes: &[u8]) -> Result<()> {
  let full = Path::new(workdir).join(rel_path);
  if let Some(parent) = full.parent() {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(&full, bytes).with_context(|| format!("writing {}", full.display()))?;
  Ok(())
}

/// Commit the artifact to the output branch and push it to origin.
///
/// Returns whether anything was pushed; an unchanged artifact stages no
/// diff and the commit/push is skipped. The previously checked-out branch
/// is restored best-effort before returning.
pub fn publish(
  workdir: &str,
  rel_path: &str,
  bytes: &[u8],
  branch: &str,
  strategy: PushStrategy,
) -> Result<bool> {
  gitio::ensure_bot_identity(workdir)?;
  let previous = gitio::current_branch(workdir)?;

  // Branch-exists / doesn't-exist split: a successful fetch (or an already
  // present local branch) means history exists; otherwise start an orphan.
  if gitio::fetch_branch(workdir, branch) || gitio::local_branch_exists(workdir, branch) {
    gitio::checkout(workdir, branch)?;
  } else {
    eprintln!("[publish] branch {:?} not found; creating orphan", branch);
    gitio::checkout_orphan(workdir, branch)?;
  }

  let result = commit_and_push(workdir, rel_path, bytes, branch, strategy);

  // Leave the checkout where we found it when running outside CI. Forced:
  // the orphan path leaves the prior branch's files untracked, which a
  // plain checkout refuses to overwrite.
  if let Some(prev) = previous {
    if prev != branch {
      let _ = gitio::checkout_force(workdir, &prev);
    }
  }

  result
}

fn commit_and_push(
  workdir: &str,
  rel_path: &str,
  bytes: &[u8],
  branch: &str,
  strategy: PushStrategy,
) -> Result<bool> {
  // (Re)write after the checkout so switching branches cannot clobber it.
  write_artifact(workdir, rel_path, bytes)?;
  gitio::stage(workdir, rel_path)?;

  if !gitio::staged_changes(workdir, rel_path) {
    eprintln!("[publish] artifact unchanged; nothing to push");
    return Ok(false);
  }

  let file_name = Path::new(rel_path)
    .file_name()
    .map(|f| f.to_string_lossy().to_string())
    .unwrap_or_else(|| rel_path.to_string());
  gitio::commit(workdir, &format!("Update {}", file_name))?;
  gitio::push(workdir, branch, matches!(strategy, PushStrategy::Force))?;
  eprintln!("[publish] pushed {} to origin/{}", rel_path, branch);

  Ok(true)
}
