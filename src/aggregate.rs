use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::extract::extract_emails;
use crate::github::IssuesApi;
use crate::model::IssueRef;

/// Shape of the published artifact. The three modes correspond to the
/// aggregation variants the deployed automation shipped over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregateMode {
  /// Every match in scan order, duplicates kept.
  Flat,
  /// Distinct addresses in first-seen order.
  Unique,
  /// Issue number -> addresses found in that issue.
  PerIssue,
}

impl AggregateMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      AggregateMode::Flat => "flat",
      AggregateMode::Unique => "unique",
      AggregateMode::PerIssue => "per-issue",
    }
  }
}

#[derive(Debug)]
enum Collected {
  List(Vec<String>),
  PerIssue(BTreeMap<i64, Vec<String>>),
}

/// Result of the aggregation phase: the artifact value plus scan counters.
#[derive(Debug)]
pub struct Aggregation {
  pub issues_scanned: usize,
  collected: Collected,
}

impl Aggregation {
  pub fn email_count(&self) -> usize {
    match &self.collected {
      Collected::List(v) => v.len(),
      Collected::PerIssue(m) => m.values().map(|v| v.len()).sum(),
    }
  }

  pub fn to_value(&self) -> serde_json::Value {
    match &self.collected {
      Collected::List(v) => serde_json::json!(v),
      Collected::PerIssue(m) => serde_json::json!(m),
    }
  }

  /// Artifact bytes: pretty-printed JSON with a trailing newline. The
  /// serialization is deterministic so an unchanged aggregate produces an
  /// unchanged file and the publish step can skip the commit.
  pub fn to_artifact_bytes(&self) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(&self.to_value())?;
    bytes.push(b'\n');
    Ok(bytes)
  }
}

/// Page through the issues listing and collect emails per the mode.
///
/// Pull requests (objects carrying a `pull_request` key) are skipped; so are
/// objects the listing returns without a number. Pagination stops at the
/// first empty page, mirroring the original scan loop.
pub fn collect(
  api: &dyn IssuesApi,
  owner: &str,
  name: &str,
  state: &str,
  filter_label: Option<&str>,
  mode: AggregateMode,
) -> Result<Aggregation> {
  let mut issues_scanned = 0usize;

  let mut flat: Vec<String> = Vec::new();
  let mut seen: HashSet<String> = HashSet::new();
  let mut per_issue: BTreeMap<i64, Vec<String>> = BTreeMap::new();

  let mut page: u32 = 1;
  loop {
    let items = api.list_issues_page(owner, name, state, filter_label, page)?;
    if items.is_empty() {
      break;
    }

    for item in &items {
      if item.get("pull_request").is_some() {
        continue;
      }
      let Some(issue) = IssueRef::from_json(item) else {
        continue;
      };

      issues_scanned += 1;
      let found = extract_emails(&issue.body);
      if found.is_empty() {
        continue;
      }

      match mode {
        AggregateMode::Flat => flat.extend(found),
        AggregateMode::Unique => {
          for email in found {
            if seen.insert(email.clone()) {
              flat.push(email);
            }
          }
        }
        AggregateMode::PerIssue => {
          let mut issue_seen: HashSet<String> = HashSet::new();
          let deduped: Vec<String> = found.into_iter().filter(|e| issue_seen.insert(e.clone())).collect();
          per_issue.insert(issue.number, deduped);
        }
      }
    }

    page += 1;
  }

  eprintln!("[aggregate] scanned {} issues across {} page(s)", issues_scanned, page - 1);

  let collected = match mode {
    AggregateMode::PerIssue => Collected::PerIssue(per_issue),
    _ => Collected::List(flat),
  };

  Ok(Aggregation { issues_scanned, collected })
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Serves fixed pages; counts how many pages were requested.
  struct PagedApi {
    pages: Vec<Vec<serde_json::Value>>,
  }

  impl IssuesApi for PagedApi {
    fn get_issue(&self, _o: &str, _n: &str, _num: i64) -> Result<serde_json::Value> {
      unreachable!("not used by collect")
    }
    fn list_issues_page(
      &self,
      _o: &str,
      _n: &str,
      _s: &str,
      _f: Option<&str>,
      page: u32,
    ) -> Result<Vec<serde_json::Value>> {
      Ok(self.pages.get((page - 1) as usize).cloned().unwrap_or_default())
    }
    fn add_label(&self, _o: &str, _n: &str, _num: i64, _l: &str) -> Result<()> {
      unreachable!("not used by collect")
    }
    fn remove_label(&self, _o: &str, _n: &str, _num: i64, _l: &str) -> Result<()> {
      unreachable!("not used by collect")
    }
  }

  fn issue_json(number: i64, body: &str) -> serde_json::Value {
    serde_json::json!({ "number": number, "body": body })
  }

  fn fixture() -> PagedApi {
    PagedApi {
      pages: vec![
        vec![
          issue_json(1, "first: a@x.io and b@y.io"),
          // PRs come back from the issues listing and must be skipped
          serde_json::json!({ "number": 2, "body": "pr@x.io", "pull_request": { "url": "..." } }),
          issue_json(3, "no address"),
        ],
        vec![issue_json(4, "again a@x.io, plus c@z.io and a@x.io")],
      ],
    }
  }

  #[test]
  fn flat_keeps_duplicates_in_scan_order() {
    let agg = collect(&fixture(), "o", "r", "open", None, AggregateMode::Flat).unwrap();
    assert_eq!(agg.issues_scanned, 3);
    assert_eq!(
      agg.to_value(),
      serde_json::json!(["a@x.io", "b@y.io", "a@x.io", "c@z.io", "a@x.io"])
    );
    assert_eq!(agg.email_count(), 5);
  }

  #[test]
  fn unique_preserves_first_seen_order() {
    let agg = collect(&fixture(), "o", "r", "open", None, AggregateMode::Unique).unwrap();
    assert_eq!(agg.to_value(), serde_json::json!(["a@x.io", "b@y.io", "c@z.io"]));
    assert_eq!(agg.email_count(), 3);
  }

  #[test]
  fn per_issue_maps_numbers_and_omits_empty() {
    let agg = collect(&fixture(), "o", "r", "open", None, AggregateMode::PerIssue).unwrap();
    assert_eq!(
      agg.to_value(),
      serde_json::json!({
        "1": ["a@x.io", "b@y.io"],
        "4": ["a@x.io", "c@z.io"]
      })
    );
    assert_eq!(agg.email_count(), 4);
  }

  #[test]
  fn empty_listing_yields_empty_artifact() {
    let api = PagedApi { pages: vec![] };
    let agg = collect(&api, "o", "r", "open", None, AggregateMode::Unique).unwrap();
    assert_eq!(agg.issues_scanned, 0);
    assert_eq!(agg.to_value(), serde_json::json!([]));
  }

  #[test]
  fn artifact_bytes_end_with_newline_and_are_stable() {
    let agg = collect(&fixture(), "o", "r", "open", None, AggregateMode::Unique).unwrap();
    let a = agg.to_artifact_bytes().unwrap();
    let b = agg.to_artifact_bytes().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.last(), Some(&b'\n'));
  }
}
