use anyhow::Result;

use crate::extract::contains_email;
use crate::github::IssuesApi;
use crate::model::{IssueRef, LabelAction};

/// What the label-sync phase should do to the triggering issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleDecision {
  Add,
  Remove,
  Keep,
}

/// Pure toggle rule: the label tracks whether the body carries an email.
pub fn decide(issue: &IssueRef, label: &str) -> ToggleDecision {
  let has_email = contains_email(&issue.body);
  let has_label = issue.has_label(label);

  match (has_email, has_label) {
    (true, false) => ToggleDecision::Add,
    (false, true) => ToggleDecision::Remove,
    _ => ToggleDecision::Keep,
  }
}

/// Apply the toggle rule via the API. Idempotent: `Keep` performs no call.
pub fn sync_label(
  api: &dyn IssuesApi,
  owner: &str,
  name: &str,
  issue: &IssueRef,
  label: &str,
) -> Result<LabelAction> {
  match decide(issue, label) {
    ToggleDecision::Add => {
      api.add_label(owner, name, issue.number, label)?;
      eprintln!("[sync] added {:?} label to issue #{}", label, issue.number);
      Ok(LabelAction::Added)
    }
    ToggleDecision::Remove => {
      api.remove_label(owner, name, issue.number, label)?;
      eprintln!("[sync] removed {:?} label from issue #{}", label, issue.number);
      Ok(LabelAction::Removed)
    }
    ToggleDecision::Keep => {
      eprintln!("[sync] issue #{} already in sync", issue.number);
      Ok(LabelAction::Unchanged)
    }
  }
}
