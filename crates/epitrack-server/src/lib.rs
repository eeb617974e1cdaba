//! Server assembly for Epitrack: configuration loading, router wiring and
//! the one-shot `--check` report.

use std::{path::Path, sync::Arc, time::Duration};

use axum::Router;
use chrono::NaiveDate;
use config::{Config, ConfigError, Environment, File};
use epitrack_core::{
  clean::CleanReport,
  pipeline::PipelineConfig,
  source::RawSource,
  view::GlobalSummary,
};
use epitrack_fetch::{Refresh, SourceConfig, TableCache, TableProvider};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Prefix for environment overrides, e.g. `EPITRACK_PORT` or
/// `EPITRACK_CACHE__TTL_SECS`.
pub const ENV_PREFIX: &str = "EPITRACK";

/// Runtime configuration, deserialised from `config.toml` and the
/// environment. Every key has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:     String,
  pub port:     u16,
  pub source:   SourceConfig,
  pub cache:    CacheConfig,
  pub pipeline: PipelineConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:     "127.0.0.1".to_string(),
      port:     8080,
      source:   SourceConfig::default(),
      cache:    CacheConfig::default(),
      pipeline: PipelineConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// The `[cache]` config section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub ttl_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self { Self { ttl_secs: 3600 } }
}

impl CacheConfig {
  pub fn build(&self) -> TableCache {
    TableCache::new(Duration::from_secs(self.ttl_secs))
  }
}

/// Load configuration from `path` (optional) and the process environment.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
  load_config_with(path, environment())
}

fn environment() -> Environment {
  Environment::with_prefix(ENV_PREFIX)
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
    .list_separator(",")
    .with_list_parse_key("source.locations")
    .with_list_parse_key("pipeline.required_fields")
}

fn load_config_with(
  path: &Path,
  env: Environment,
) -> Result<ServerConfig, ConfigError> {
  Config::builder()
    .add_source(File::from(path.to_path_buf()).required(false))
    .add_source(env)
    .build()?
    .try_deserialize()
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The full HTTP application: the JSON API with request tracing.
pub fn router<S>(provider: Arc<TableProvider<S>>) -> Router
where
  S: RawSource + 'static,
{
  epitrack_api::api_router(provider).layer(TraceLayer::new_for_http())
}

// ─── Check mode ──────────────────────────────────────────────────────────────

/// What `--check` prints after a single load.
#[derive(Debug, Serialize)]
pub struct CheckReport {
  pub revision:   String,
  pub rows:       usize,
  pub countries:  usize,
  pub first_date: Option<NaiveDate>,
  pub last_date:  Option<NaiveDate>,
  pub report:     CleanReport,
  pub summary:    Option<GlobalSummary>,
}

impl From<Refresh> for CheckReport {
  fn from(refresh: Refresh) -> Self {
    let table = refresh.table;
    let bounds = table.date_bounds();
    Self {
      revision:   table.revision().to_owned(),
      rows:       table.len(),
      countries:  table.countries().len(),
      first_date: bounds.map(|(first, _)| first),
      last_date:  bounds.map(|(_, last)| last),
      report:     refresh.report,
      summary:    table.global_summary(),
    }
  }
}
