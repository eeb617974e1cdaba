//! The raw tabular dataset, as delivered by a [`RawSource`](crate::source::RawSource).

/// A header row plus string cells. An absent or empty cell is `None`.
///
/// Rows may be shorter than the header; missing trailing cells read as
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
  pub headers:  Vec<String>,
  pub rows:     Vec<Vec<Option<String>>>,
  /// Identifies the content the table was decoded from (hex SHA-256 of the
  /// source bytes when produced by the CSV codec). Empty when unknown.
  pub revision: String,
}

impl RawTable {
  pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
    Self {
      headers,
      rows,
      revision: String::new(),
    }
  }

  pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
    self.revision = revision.into();
    self
  }

  /// Index of the column whose (trimmed) header is exactly `name`.
  pub fn column(&self, name: &str) -> Option<usize> {
    self.headers.iter().position(|h| h.trim() == name)
  }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}
