// core/src/site.rs

//! Per-deployment settings that shape the forms.

use std::time::Duration;

/// Return points offered when no site list is configured.
pub const DEFAULT_RETURN_POINTS: &[&str] = &["东门", "西门", "南门", "北门", "图书馆", "一食堂"];

/// Interval at which admin and log views re-fetch.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// The fixed, ordered set of named drop-off locations for a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnPoints(Vec<String>);

impl ReturnPoints {
  /// Builds the list, trimming names and dropping blanks and duplicates.
  /// Returns `None` if nothing usable remains.
  pub fn new<I, S>(names: I) -> Option<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut points: Vec<String> = Vec::new();
    for name in names {
      let name = name.as_ref().trim();
      if !name.is_empty() && !points.iter().any(|p| p == name) {
        points.push(name.to_string());
      }
    }
    if points.is_empty() {
      None
    } else {
      Some(Self(points))
    }
  }

  /// Parses a comma-separated list such as `东门,西门`.
  pub fn parse_list(raw: &str) -> Option<Self> {
    Self::new(raw.split(','))
  }

  pub fn contains(&self, name: &str) -> bool {
    self.0.iter().any(|p| p == name)
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl Default for ReturnPoints {
  fn default() -> Self {
    Self(DEFAULT_RETURN_POINTS.iter().map(|p| p.to_string()).collect())
  }
}
