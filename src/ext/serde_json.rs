/// Extension to walk nested values via dotted paths like `"issue.user.login"`.
///
/// Missing path segments yield `None`; no panics. The typed accessors borrow
/// where possible instead of cloning.
pub trait JsonPath {
  fn path(&self, dotted: &str) -> Option<&serde_json::Value>;

  fn path_str(&self, dotted: &str) -> Option<&str> {
    self.path(dotted).and_then(|v| v.as_str())
  }

  fn path_i64(&self, dotted: &str) -> Option<i64> {
    self.path(dotted).and_then(|v| v.as_i64())
  }

  fn path_array(&self, dotted: &str) -> Option<&Vec<serde_json::Value>> {
    self.path(dotted).and_then(|v| v.as_array())
  }
}

impl JsonPath for serde_json::Value {
  fn path(&self, dotted: &str) -> Option<&serde_json::Value> {
    if dotted.is_empty() {
      return Some(self);
    }

    let mut cur = self;

    for key in dotted.split('.') {
      cur = cur.get(key)?;
    }

    Some(cur)
  }
}
