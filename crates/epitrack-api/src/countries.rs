//! Handlers for `/countries` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/countries` | Sorted distinct names |
//! | `GET`  | `/countries/{country}/series` | Optional `start`, `end`; empty for unknown countries |
//! | `GET`  | `/countries/{country}/latest` | 404 if the country has no records |

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::HeaderMap,
  response::Response,
};
use chrono::NaiveDate;
use epitrack_core::{source::RawSource, view::DateWindow};
use epitrack_fetch::TableProvider;
use serde::Deserialize;

use crate::{error::ApiError, load, respond};

/// `GET /countries`
pub async fn list<S: RawSource>(
  State(provider): State<Arc<TableProvider<S>>>,
  headers: HeaderMap,
) -> Result<Response, ApiError> {
  let table = load(&provider).await?;
  Ok(respond(&headers, &table, table.countries()))
}

// ─── Series ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct SeriesParams {
  pub start: Option<NaiveDate>,
  pub end:   Option<NaiveDate>,
}

/// `GET /countries/{country}/series[?start=YYYY-MM-DD][&end=YYYY-MM-DD]`
pub async fn series<S: RawSource>(
  State(provider): State<Arc<TableProvider<S>>>,
  Path(country): Path<String>,
  Query(params): Query<SeriesParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError> {
  let table = load(&provider).await?;
  let window = DateWindow {
    start: params.start,
    end:   params.end,
  };
  let mut records = table.time_series(&country);
  records.retain(|r| window.contains(r.date));
  Ok(respond(&headers, &table, records))
}

// ─── Latest ──────────────────────────────────────────────────────────────────

/// `GET /countries/{country}/latest`
pub async fn latest<S: RawSource>(
  State(provider): State<Arc<TableProvider<S>>>,
  Path(country): Path<String>,
  headers: HeaderMap,
) -> Result<Response, ApiError> {
  let table = load(&provider).await?;
  let record = table
    .latest(&country)
    .ok_or_else(|| ApiError::NotFound(format!("no records for {country:?}")))?;
  Ok(respond(&headers, &table, record))
}
