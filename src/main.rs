use anyhow::{Context, Result};
use clap::Parser;

mod aggregate;
mod cli;
mod event;
mod ext;
mod extract;
mod github;
mod gitio;
mod model;
mod publish;
mod sync;
mod util;

use crate::cli::{Cli, EffectiveConfig, normalize};
use crate::model::{IssueRef, RunSummary};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI and pick an API backend
  let cfg = normalize(cli)?;
  let api = github::build_api(github::get_github_token())?;

  // Phase 2: toggle the label on the triggering issue, when there is one
  let label_action = if cfg.skip_label_sync {
    None
  } else {
    match resolve_trigger_issue(&cfg, api.as_ref())? {
      Some(issue) => Some(sync::sync_label(api.as_ref(), &cfg.owner, &cfg.name, &issue, &cfg.label)?),
      None => {
        eprintln!("[sync] no triggering issue; skipping label sync");
        None
      }
    }
  };

  // Phase 3: aggregate emails across the issues listing
  let agg = aggregate::collect(
    api.as_ref(),
    &cfg.owner,
    &cfg.name,
    cfg.issue_state.as_str(),
    cfg.filter_label.as_deref(),
    cfg.aggregate,
  )?;
  let bytes = agg.to_artifact_bytes()?;

  // Phase 4: write the artifact; publish unless told not to
  let pushed = if cfg.skip_publish {
    publish::write_artifact(&cfg.workdir, &cfg.out, &bytes)?;
    false
  } else {
    publish::publish(&cfg.workdir, &cfg.out, &bytes, &cfg.branch, cfg.push_strategy)?
  };

  // Phase 5: summary to stdout
  let summary = RunSummary {
    repo: format!("{}/{}", cfg.owner, cfg.name),
    aggregate: cfg.aggregate.as_str().to_string(),
    issues_scanned: agg.issues_scanned,
    emails: agg.email_count(),
    artifact: cfg.out.clone(),
    branch: cfg.branch.clone(),
    pushed,
    label_action,
    generated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
  };
  println!("{}", serde_json::to_string_pretty(&summary)?);

  Ok(())
}

/// The issue the label-sync phase operates on: an explicit `--issue-number`
/// (fetched via the API) wins over the event payload; no payload means no
/// label sync (scheduled runs).
fn resolve_trigger_issue(cfg: &EffectiveConfig, api: &dyn github::IssuesApi) -> Result<Option<IssueRef>> {
  if let Some(number) = cfg.issue_number {
    let v = api.get_issue(&cfg.owner, &cfg.name, number)?;
    let issue = IssueRef::from_json(&v).with_context(|| format!("issue #{} response missing fields", number))?;
    return Ok(Some(issue));
  }

  match cfg.event_path.as_deref() {
    Some(path) => event::load_trigger_issue(std::path::Path::new(path)),
    None => Ok(None),
  }
}
