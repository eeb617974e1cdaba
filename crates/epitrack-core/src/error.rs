//! Error types for `epitrack-core`.
//!
//! Only two failures are fatal to a refresh: the source could not be fetched
//! from any location ([`FetchError`]), or the fetched table lacks required
//! columns ([`SchemaError`]). Row-level defects are never errors; they are
//! counted in a [`CleanReport`](crate::clean::CleanReport).

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::schema::Field;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Schema(#[from] SchemaError),

  #[error(transparent)]
  Fetch(#[from] FetchError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Schema ──────────────────────────────────────────────────────────────────

/// One or more required fields are absent from the raw dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", describe_missing(.missing))]
pub struct SchemaError {
  /// The absent fields, in required-list order.
  pub missing: Vec<Field>,
}

fn describe_missing(missing: &[Field]) -> String {
  missing
    .iter()
    .map(|f| {
      if f.canonical_name() == f.source_name() {
        f.canonical_name().to_string()
      } else {
        format!("{} (or {})", f.canonical_name(), f.source_name())
      }
    })
    .collect::<Vec<_>>()
    .join(", ")
}

// ─── Fetch ───────────────────────────────────────────────────────────────────

/// A single location that was tried and failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
  pub location: String,
  pub reason:   String,
}

impl fmt::Display for FetchFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.location, self.reason)
  }
}

/// The raw dataset could not be obtained from any configured location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  #[error("no source locations configured")]
  NoLocations,

  #[error(
    "all {} source locations failed: {}",
    .0.len(),
    describe_failures(.0)
  )]
  Exhausted(Vec<FetchFailure>),
}

impl FetchError {
  /// Every attempted location with its failure, in attempt order.
  pub fn failures(&self) -> &[FetchFailure] {
    match self {
      Self::NoLocations => &[],
      Self::Exhausted(failures) => failures,
    }
  }
}

fn describe_failures(failures: &[FetchFailure]) -> String {
  failures
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("; ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn schema_error_names_source_alias() {
    let err = SchemaError {
      missing: vec![Field::Population, Field::CumulativeCases],
    };
    assert_eq!(
      err.to_string(),
      "missing required fields: population, cumulative_cases (or total_cases)"
    );
  }

  #[test]
  fn exhausted_lists_every_location() {
    let err = FetchError::Exhausted(vec![
      FetchFailure {
        location: "https://a.example/data.csv".into(),
        reason:   "HTTP 503".into(),
      },
      FetchFailure {
        location: "/tmp/missing.csv".into(),
        reason:   "not found".into(),
      },
    ]);
    let msg = err.to_string();
    assert!(msg.starts_with("all 2 source locations failed"), "{msg}");
    assert!(msg.contains("https://a.example/data.csv: HTTP 503"), "{msg}");
    assert!(msg.contains("/tmp/missing.csv: not found"), "{msg}");
    assert_eq!(err.failures().len(), 2);
  }
}
