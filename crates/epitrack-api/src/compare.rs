//! Handlers for multi-country metric comparisons.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/compare` | One series per country, in request order |
//! | `GET`  | `/latest` | Latest value per country; countries without data are omitted |
//!
//! `countries` is a comma-separated list and must name at least one country.
//! `metric` defaults to `daily_cases`; `per_100k=true` normalises by
//! population (ignored for `cfr`).

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::HeaderMap,
  response::Response,
};
use chrono::NaiveDate;
use epitrack_core::{metrics::Metric, source::RawSource, view::DateWindow};
use epitrack_fetch::TableProvider;
use serde::Deserialize;

use crate::{error::ApiError, load, respond, split_list};

#[derive(Debug, Deserialize, Default)]
pub struct CompareParams {
  /// Comma-separated country names, e.g. `France,Germany`.
  pub countries: String,
  #[serde(default)]
  pub metric:    Metric,
  #[serde(default)]
  pub per_100k:  bool,
  pub start:     Option<NaiveDate>,
  pub end:       Option<NaiveDate>,
}

impl CompareParams {
  fn country_list(&self) -> Result<Vec<String>, ApiError> {
    let countries = split_list(&self.countries);
    if countries.is_empty() {
      return Err(ApiError::BadRequest("no countries requested".into()));
    }
    Ok(countries)
  }
}

/// `GET /compare?countries=a,b[&metric=...][&per_100k=true][&start=...][&end=...]`
pub async fn series<S: RawSource>(
  State(provider): State<Arc<TableProvider<S>>>,
  Query(params): Query<CompareParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError> {
  let countries = params.country_list()?;
  let window = DateWindow {
    start: params.start,
    end:   params.end,
  };

  let table = load(&provider).await?;
  let series = table.series(&countries, params.metric, params.per_100k, window);
  Ok(respond(&headers, &table, series))
}

/// `GET /latest?countries=a,b[&metric=...][&per_100k=true]`
pub async fn latest<S: RawSource>(
  State(provider): State<Arc<TableProvider<S>>>,
  Query(params): Query<CompareParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError> {
  let countries = params.country_list()?;

  let table = load(&provider).await?;
  let values = table.latest_values(&countries, params.metric, params.per_100k);
  Ok(respond(&headers, &table, values))
}
