use once_cell::sync::Lazy;
use regex::Regex;

// Same pattern the published action matched issue bodies against; kept
// byte-for-byte so the artifact contents stay stable across the rewrite.
static RE_EMAIL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+").unwrap());

pub fn contains_email(body: &str) -> bool {
  RE_EMAIL.is_match(body)
}

/// All email matches in `body`, in scan order. Duplicates are kept;
/// aggregation modes decide whether to collapse them.
pub fn extract_emails(body: &str) -> Vec<String> {
  RE_EMAIL.find_iter(body).map(|m| m.as_str().to_string()).collect()
}
