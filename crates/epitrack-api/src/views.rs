//! Handlers for date-keyed views across all countries.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/range?start=&end=` | Inclusive; empty when `start > end` |
//! | `GET`  | `/snapshot/{date}` | `?fallback=latest` substitutes latest-per-country when empty |

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::HeaderMap,
  response::Response,
};
use chrono::NaiveDate;
use epitrack_core::{record::CanonicalRecord, source::RawSource};
use epitrack_fetch::TableProvider;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, load, respond};

// ─── Range ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

/// `GET /range?start=YYYY-MM-DD&end=YYYY-MM-DD`
pub async fn range<S: RawSource>(
  State(provider): State<Arc<TableProvider<S>>>,
  Query(params): Query<RangeParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError> {
  let table = load(&provider).await?;
  let records = table.date_range(params.start, params.end);
  Ok(respond(&headers, &table, records))
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
  #[default]
  None,
  Latest,
}

#[derive(Debug, Deserialize, Default)]
pub struct SnapshotParams {
  #[serde(default)]
  pub fallback: Fallback,
}

#[derive(Debug, Serialize)]
pub struct SnapshotBody<'a> {
  pub date:          NaiveDate,
  /// `true` when no record matched `date` and latest-per-country was
  /// returned instead.
  pub fallback_used: bool,
  pub records:       Vec<&'a CanonicalRecord>,
}

/// `GET /snapshot/{date}[?fallback=latest]`
pub async fn snapshot<S: RawSource>(
  State(provider): State<Arc<TableProvider<S>>>,
  Path(date): Path<NaiveDate>,
  Query(params): Query<SnapshotParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError> {
  let table = load(&provider).await?;

  let mut records = table.snapshot(date);
  let fallback_used = records.is_empty() && params.fallback == Fallback::Latest;
  if fallback_used {
    records = table.latest_per_country();
  }

  Ok(respond(&headers, &table, SnapshotBody {
    date,
    fallback_used,
    records,
  }))
}
