//! [`FallbackSource`]: prioritised locations with first-success semantics.

use std::{path::PathBuf, time::Duration};

use bytes::Bytes;
use epitrack_core::{
  FetchError,
  FetchFailure,
  raw::RawTable,
  schema::Field,
  source::RawSource,
};
use reqwest::Client;
use serde::Deserialize;

use crate::{Error, Result, location::Location};

/// Locations tried when none are configured explicitly.
pub const DEFAULT_LOCATIONS: [&str; 3] = [
  "https://covid.ourworldindata.org/data/owid-covid-data.csv",
  "https://raw.githubusercontent.com/owid/covid-19-data/master/public/data/owid-covid-data.csv",
  "https://catalog.ourworldindata.org/garden/covid/latest/compact/compact.csv",
];

// ─── Configuration ───────────────────────────────────────────────────────────

/// The `[source]` config section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
  /// Tried in order; the first that downloads and decodes wins.
  pub locations:    Vec<Location>,
  /// Per-request timeout for remote locations.
  pub timeout_secs: u64,
  /// If set, the bytes of a successful remote fetch are written here.
  pub save_raw_to:  Option<PathBuf>,
}

impl Default for SourceConfig {
  fn default() -> Self {
    Self {
      locations:    DEFAULT_LOCATIONS
        .iter()
        .map(|l| Location::parse(l))
        .collect(),
      timeout_secs: 30,
      save_raw_to:  None,
    }
  }
}

// ─── Source ──────────────────────────────────────────────────────────────────

/// A [`RawSource`] over an ordered list of locations.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct FallbackSource {
  client:      Client,
  locations:   Vec<Location>,
  save_raw_to: Option<PathBuf>,
}

impl FallbackSource {
  pub fn new(config: SourceConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(Error::Client)?;
    Ok(Self::with_client(client, config))
  }

  /// Use a preconfigured client; `config.timeout_secs` is ignored.
  pub fn with_client(client: Client, config: SourceConfig) -> Self {
    Self {
      client,
      locations: config.locations,
      save_raw_to: config.save_raw_to,
    }
  }

  pub fn locations(&self) -> &[Location] { &self.locations }

  async fn try_location(&self, location: &Location) -> Result<RawTable> {
    let bytes = match location {
      Location::Http(url) => self.download(url).await?,
      Location::File(path) => Bytes::from(tokio::fs::read(path).await?),
    };

    let decoded = bytes.clone();
    let table = tokio::task::spawn_blocking(move || {
      let columns: Vec<&str> = Field::column_names().collect();
      epitrack_csv::decode_columns(&decoded, &columns)
    })
    .await??;

    if location.is_remote()
      && let Some(path) = &self.save_raw_to
    {
      match tokio::fs::write(path, &bytes).await {
        Ok(()) => tracing::debug!(path = %path.display(), "saved raw dataset"),
        Err(e) => {
          tracing::warn!(
            path = %path.display(),
            error = %e,
            "failed to save raw dataset"
          )
        }
      }
    }

    Ok(table)
  }

  async fn download(&self, url: &str) -> Result<Bytes> {
    let resp = self.client.get(url).send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }
    Ok(resp.bytes().await?)
  }
}

impl RawSource for FallbackSource {
  async fn fetch_raw(&self) -> Result<RawTable, FetchError> {
    if self.locations.is_empty() {
      return Err(FetchError::NoLocations);
    }

    let mut failures = Vec::new();
    for location in &self.locations {
      match self.try_location(location).await {
        Ok(table) => {
          tracing::info!(%location, rows = table.len(), "fetched raw dataset");
          return Ok(table);
        }
        Err(e) => {
          tracing::warn!(%location, error = %e, "source location failed");
          failures.push(FetchFailure {
            location: location.to_string(),
            reason:   e.to_string(),
          });
        }
      }
    }
    Err(FetchError::Exhausted(failures))
  }
}
