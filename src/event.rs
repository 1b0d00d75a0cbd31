use std::path::Path;

use anyhow::{Context, Result};

use crate::model::IssueRef;

/// Load the CI event payload and pull out the triggering issue, if any.
///
/// Scheduled and manual runs carry no `issue` object; that is `Ok(None)`,
/// not an error. A present-but-malformed issue object is an error.
pub fn load_trigger_issue(path: &Path) -> Result<Option<IssueRef>> {
  let text = std::fs::read_to_string(path)
    .with_context(|| format!("reading event payload {}", path.display()))?;
  let payload: serde_json::Value =
    serde_json::from_str(&text).with_context(|| format!("parsing event payload {}", path.display()))?;

  let Some(issue_json) = payload.get("issue") else {
    return Ok(None);
  };

  match IssueRef::from_json(issue_json) {
    Some(issue) => Ok(Some(issue)),
    None => anyhow::bail!("event payload {} has an issue object without a number", path.display()),
  }
}
