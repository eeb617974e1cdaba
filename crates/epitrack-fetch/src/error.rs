//! Error type for `epitrack-fetch`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("HTTP {0}")]
  Status(reqwest::StatusCode),

  #[error("read failed: {0}")]
  Io(#[from] std::io::Error),

  #[error("decode failed: {0}")]
  Decode(#[from] epitrack_csv::Error),

  #[error("background task failed: {0}")]
  Task(#[from] tokio::task::JoinError),

  #[error(transparent)]
  Fetch(#[from] epitrack_core::FetchError),

  /// A concurrent refresh failed while this caller waited for it.
  #[error("refresh failed: {0}")]
  RecentFailure(String),

  #[error(transparent)]
  Schema(#[from] epitrack_core::SchemaError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
