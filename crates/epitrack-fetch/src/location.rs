//! Where a raw dataset can be read from.

use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

/// An HTTP(S) URL or a local file.
///
/// Parsed from a plain string: `http://` and `https://` are remote,
/// `file://` prefixes are stripped, anything else is a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Location {
  Http(String),
  File(PathBuf),
}

impl Location {
  pub fn parse(s: &str) -> Self {
    let s = s.trim();
    if s.starts_with("http://") || s.starts_with("https://") {
      Self::Http(s.to_string())
    } else {
      Self::File(PathBuf::from(s.strip_prefix("file://").unwrap_or(s)))
    }
  }

  pub fn is_remote(&self) -> bool { matches!(self, Self::Http(_)) }
}

impl From<String> for Location {
  fn from(s: String) -> Self { Self::parse(&s) }
}

impl From<Location> for String {
  fn from(l: Location) -> Self { l.to_string() }
}

impl fmt::Display for Location {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Http(url) => f.write_str(url),
      Self::File(path) => write!(f, "{}", path.display()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_urls_and_paths() {
    assert_eq!(
      Location::parse("https://example.org/data.csv"),
      Location::Http("https://example.org/data.csv".into())
    );
    assert_eq!(
      Location::parse("file:///var/lib/epitrack/raw.csv"),
      Location::File("/var/lib/epitrack/raw.csv".into())
    );
    assert_eq!(
      Location::parse(" covid_data.csv "),
      Location::File("covid_data.csv".into())
    );
  }

  #[test]
  fn only_http_is_remote() {
    assert!(Location::parse("http://localhost/x.csv").is_remote());
    assert!(!Location::parse("/tmp/x.csv").is_remote());
  }
}
