use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::aggregate::AggregateMode;
use crate::github;
use crate::publish::PushStrategy;
use crate::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
  Open,
  Closed,
  All,
}

impl IssueState {
  pub fn as_str(&self) -> &'static str {
    match self {
      IssueState::Open => "open",
      IssueState::Closed => "closed",
      IssueState::All => "all",
    }
  }
}

#[derive(Parser, Debug)]
#[command(
    name = "subscribe-sync",
    version,
    about = "Toggle a subscribe label from issue-body emails and publish the aggregate JSON to a branch",
    long_about = None
)]
pub struct Cli {
  /// Local checkout used for publishing and origin detection (default: current dir)
  #[arg(long, default_value = ".")]
  pub workdir: PathBuf,

  /// Target repository as owner/name; defaults to $GITHUB_REPOSITORY, then the workdir's GitHub origin
  #[arg(long)]
  pub repo: Option<String>,

  /// Label toggled on the triggering issue
  #[arg(long, default_value = "subscribe")]
  pub label: String,

  /// Issue state scanned during aggregation
  #[arg(long, value_enum, default_value_t = IssueState::Open)]
  pub issue_state: IssueState,

  /// Only aggregate issues carrying this label
  #[arg(long)]
  pub filter_label: Option<String>,

  /// Artifact shape
  #[arg(long, value_enum, default_value_t = AggregateMode::Unique)]
  pub aggregate: AggregateMode,

  /// Artifact path relative to the workdir
  #[arg(long, default_value = "v2/subscribe.json")]
  pub out: String,

  /// Branch the artifact is published to
  #[arg(long, default_value = "output")]
  pub branch: String,

  /// How the output branch is obtained and pushed
  #[arg(long, value_enum, default_value_t = PushStrategy::FetchOrOrphan)]
  pub push_strategy: PushStrategy,

  /// Run label sync against this issue (fetched via the API) instead of the event payload
  #[arg(long, conflicts_with = "event_path")]
  pub issue_number: Option<i64>,

  /// Event payload JSON; defaults to $GITHUB_EVENT_PATH
  #[arg(long)]
  pub event_path: Option<PathBuf>,

  /// Skip the label-sync phase (aggregate and publish only)
  #[arg(long)]
  pub skip_label_sync: bool,

  /// Write the artifact but do not commit or push
  #[arg(long)]
  pub skip_publish: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub workdir: String, // absolute path for stability
  pub owner: String,
  pub name: String,
  pub label: String,
  pub issue_state: IssueState,
  pub filter_label: Option<String>,
  pub aggregate: AggregateMode,
  pub out: String,
  pub branch: String,
  pub push_strategy: PushStrategy,
  pub issue_number: Option<i64>,
  pub event_path: Option<String>,
  pub skip_label_sync: bool,
  pub skip_publish: bool,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let workdir = util::canonicalize_lossy(&cli.workdir);

  // Resolve owner/name: explicit flag, then Actions env, then git origin.
  let repo_str = match cli.repo {
    Some(r) => r,
    None => match std::env::var("GITHUB_REPOSITORY").ok().filter(|s| !s.trim().is_empty()) {
      Some(r) => r,
      None => match github::parse_origin_github(&workdir) {
        Some((o, n)) => format!("{}/{}", o, n),
        None => {
          bail!("cannot determine target repository: pass --repo, set GITHUB_REPOSITORY, or add a GitHub origin remote")
        }
      },
    },
  };

  let (owner, name) = match repo_str.split_once('/') {
    Some((o, n)) if !o.is_empty() && !n.is_empty() && !n.contains('/') => (o.to_string(), n.to_string()),
    _ => bail!("--repo must be of the form owner/name, got {:?}", repo_str),
  };

  if cli.out.trim().is_empty() || cli.out.starts_with('/') {
    bail!("--out must be a relative path inside the workdir, got {:?}", cli.out);
  }

  let event_path = cli
    .event_path
    .map(|p| p.to_string_lossy().to_string())
    .or_else(|| std::env::var("GITHUB_EVENT_PATH").ok().filter(|s| !s.trim().is_empty()));

  Ok(EffectiveConfig {
    workdir,
    owner,
    name,
    label: cli.label,
    issue_state: cli.issue_state,
    filter_label: cli.filter_label,
    aggregate: cli.aggregate,
    out: cli.out,
    branch: cli.branch,
    push_strategy: cli.push_strategy,
    issue_number: cli.issue_number,
    event_path,
    skip_label_sync: cli.skip_label_sync,
    skip_publish: cli.skip_publish,
  })
}
