use anyhow::{Context, Result};
use once_cell::sync::Lazy;

use crate::model::IssueRef;
use crate::util::run_git;

/// Trait seam over the issues REST surface so tests can swap the backend.
pub trait IssuesApi {
  fn get_issue(&self, owner: &str, name: &str, number: i64) -> Result<serde_json::Value>;

  /// One page of the issues listing (1-based). An empty vec ends pagination.
  /// Note the endpoint also returns pull requests; callers skip those.
  fn list_issues_page(
    &self,
    owner: &str,
    name: &str,
    state: &str,
    filter_label: Option<&str>,
    page: u32,
  ) -> Result<Vec<serde_json::Value>>;

  fn add_label(&self, owner: &str, name: &str, number: i64, label: &str) -> Result<()>;

  fn remove_label(&self, owner: &str, name: &str, number: i64, label: &str) -> Result<()>;
}

/// Parse `remote.origin.url` to extract (owner, repo) when hosted on GitHub.
pub fn parse_origin_github(repo: &str) -> Option<(String, String)> {
  static RE_ORIGIN: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^(?:git@github\.com:|https?://github\.com/)([^/]+)/([^/]+?)(?:\.git)?$").unwrap()
  });

  let url = run_git(repo, &["config".into(), "--get".into(), "remote.origin.url".into()]).ok()?;
  let caps = RE_ORIGIN.captures(url.trim())?;

  Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().to_string()))
}

/// Discover a GitHub token: env vars first, then `gh auth token` if available.
pub fn get_github_token() -> Option<String> {
  for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
    if let Ok(t) = std::env::var(var) {
      if !t.trim().is_empty() {
        return Some(t);
      }
    }
  }

  if let Ok(output) = std::process::Command::new("gh").args(["auth", "token"]).output() {
    if output.status.success() {
      let t = String::from_utf8_lossy(&output.stdout).trim().to_string();

      if !t.is_empty() {
        return Some(t);
      }
    }
  }

  None
}

struct GithubHttpApi {
  agent: ureq::Agent,
  token: String,
}

impl GithubHttpApi {
  fn new(token: String) -> Self {
    Self {
      agent: ureq::AgentBuilder::new().build(),
      token,
    }
  }

  fn request(&self, method: &str, url: &str) -> ureq::Request {
    self
      .agent
      .request(method, url)
      .set("Accept", "application/vnd.github+json")
      .set("User-Agent", "subscribe-sync")
      .set("Authorization", &format!("Bearer {}", self.token))
  }

  fn get_json(&self, url: &str) -> Result<serde_json::Value> {
    let resp = self.request("GET", url).call().with_context(|| format!("GET {}", url))?;
    resp
      .into_json::<serde_json::Value>()
      .with_context(|| format!("decoding response of GET {}", url))
  }
}

impl IssuesApi for GithubHttpApi {
  fn get_issue(&self, owner: &str, name: &str, number: i64) -> Result<serde_json::Value> {
    let url = format!("https://api.github.com/repos/{}/{}/issues/{}", owner, name, number);
    self.get_json(&url)
  }

  fn list_issues_page(
    &self,
    owner: &str,
    name: &str,
    state: &str,
    filter_label: Option<&str>,
    page: u32,
  ) -> Result<Vec<serde_json::Value>> {
    let mut url = format!(
      "https://api.github.com/repos/{}/{}/issues?state={}&per_page=100&page={}",
      owner, name, state, page
    );
    if let Some(l) = filter_label {
      url.push_str(&format!("&labels={}", l));
    }

    let v = self.get_json(&url)?;

    match v {
      serde_json::Value::Array(items) => Ok(items),
      other => anyhow::bail!("GET {} returned non-array response: {}", url, other),
    }
  }

  fn add_label(&self, owner: &str, name: &str, number: i64, label: &str) -> Result<()> {
    let url = format!(
      "https://api.github.com/repos/{}/{}/issues/{}/labels",
      owner, name, number
    );
    self
      .request("POST", &url)
      .send_json(serde_json::json!({ "labels": [label] }))
      .with_context(|| format!("adding label {:?} to issue #{}", label, number))?;
    Ok(())
  }

  fn remove_label(&self, owner: &str, name: &str, number: i64, label: &str) -> Result<()> {
    let url = format!(
      "https://api.github.com/repos/{}/{}/issues/{}/labels/{}",
      owner, name, number, label
    );
    let resp = self.request("DELETE", &url).call();

    match resp {
      Ok(_) => Ok(()),
      // Already absent counts as removed; label state can drift between
      // the event snapshot and this call.
      Err(ureq::Error::Status(404, _)) => Ok(()),
      Err(e) => Err(e).with_context(|| format!("removing label {:?} from issue #{}", label, number)),
    }
  }
}

// --- Env-backed mock for integration tests without network ---

const ENV_ISSUES: &str = "SUBSYNC_TEST_ISSUES_JSON";
const ENV_ISSUE: &str = "SUBSYNC_TEST_ISSUE_JSON";
const ENV_MUTATION_LOG: &str = "SUBSYNC_TEST_MUTATION_LOG";

struct GithubEnvApi;

impl GithubEnvApi {
  fn log_mutation(&self, action: &str, number: i64, label: &str) -> Result<()> {
    let Ok(path) = std::env::var(ENV_MUTATION_LOG) else {
      return Ok(());
    };

    use std::io::Write;
    let mut f = std::fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(&path)
      .with_context(|| format!("opening mutation log {}", path))?;
    writeln!(f, "{} {} {}", action, number, label)?;
    Ok(())
  }

  /// Client-side copy of the server's state/label filtering, so mock runs
  /// see the same listing the HTTP backend would.
  fn keep(v: &serde_json::Value, state: &str, filter_label: Option<&str>) -> bool {
    if state != "all" {
      if let Some(s) = v.get("state").and_then(|s| s.as_str()) {
        if s != state {
          return false;
        }
      }
    }

    if let Some(want) = filter_label {
      let labeled = IssueRef::from_json(v).map(|i| i.has_label(want)).unwrap_or(false);
      if !labeled {
        return false;
      }
    }

    true
  }
}

impl IssuesApi for GithubEnvApi {
  fn get_issue(&self, _owner: &str, _name: &str, number: i64) -> Result<serde_json::Value> {
    let s = std::env::var(ENV_ISSUE).with_context(|| format!("no mock issue for #{}", number))?;
    serde_json::from_str(&s).context("parsing mock issue JSON")
  }

  fn list_issues_page(
    &self,
    _owner: &str,
    _name: &str,
    state: &str,
    filter_label: Option<&str>,
    page: u32,
  ) -> Result<Vec<serde_json::Value>> {
    let Ok(s) = std::env::var(ENV_ISSUES) else {
      return Ok(Vec::new());
    };
    let v: serde_json::Value = serde_json::from_str(&s).context("parsing mock issues JSON")?;
    let Some(arr) = v.as_array() else {
      anyhow::bail!("mock issues JSON must be an array");
    };

    // An array of arrays is served page by page; a flat array is one page.
    let page_items: Vec<serde_json::Value> = if arr.first().map(|e| e.is_array()).unwrap_or(false) {
      arr
        .get((page - 1) as usize)
        .and_then(|p| p.as_array())
        .cloned()
        .unwrap_or_default()
    } else if page == 1 {
      arr.clone()
    } else {
      Vec::new()
    };

    Ok(
      page_items
        .into_iter()
        .filter(|v| Self::keep(v, state, filter_label))
        .collect(),
    )
  }

  fn add_label(&self, _owner: &str, _name: &str, number: i64, label: &str) -> Result<()> {
    self.log_mutation("add", number, label)
  }

  fn remove_label(&self, _owner: &str, _name: &str, number: i64, label: &str) -> Result<()> {
    self.log_mutation("remove", number, label)
  }
}

fn env_wants_mock() -> bool {
  std::env::vars().any(|(k, _)| k.starts_with("SUBSYNC_TEST_"))
}

/// Select the backend: env mock when fixture vars are present, otherwise
/// the HTTP client (which requires a token).
pub fn build_api(token: Option<String>) -> Result<Box<dyn IssuesApi>> {
  if env_wants_mock() {
    return Ok(Box::new(GithubEnvApi));
  }

  match token {
    Some(t) => Ok(Box::new(GithubHttpApi::new(t))),
    None => anyhow::bail!("GITHUB_TOKEN is not set (or run: gh auth login)"),
  }
}
