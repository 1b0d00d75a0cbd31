use serde::{Deserialize, Serialize};

use crate::ext::serde_json::JsonPath;

/// A tracker issue reduced to the fields this tool acts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRef {
  pub number: i64,
  pub body: String,
  pub labels: Vec<String>,
}

impl IssueRef {
  /// Build from an API or event-payload issue object.
  ///
  /// `body` may be null (treated as empty); `labels` entries may be plain
  /// strings or `{ "name": ... }` objects, both shapes occur in payloads.
  pub fn from_json(v: &serde_json::Value) -> Option<IssueRef> {
    let number = v.path_i64("number")?;
    let body = v.path_str("body").unwrap_or_default().to_string();

    let labels = v
      .path_array("labels")
      .map(|arr| {
        arr
          .iter()
          .filter_map(|l| l.as_str().or_else(|| l.path_str("name")))
          .map(|s| s.to_string())
          .collect()
      })
      .unwrap_or_default();

    Some(IssueRef { number, body, labels })
  }

  pub fn has_label(&self, name: &str) -> bool {
    self.labels.iter().any(|l| l == name)
  }
}

/// Outcome of the label-sync phase for the triggering issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelAction {
  Added,
  Removed,
  Unchanged,
}

/// Run summary printed to stdout after a successful run.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunSummary {
  pub repo: String,
  pub aggregate: String,
  pub issues_scanned: usize,
  pub emails: usize,
  pub artifact: String,
  pub branch: String,
  pub pushed: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub label_action: Option<LabelAction>,
  pub generated_at: String,
}
