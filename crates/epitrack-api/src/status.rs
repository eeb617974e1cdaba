//! Handlers for `/summary` and `/refresh`.

use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap, response::Response};
use chrono::NaiveDate;
use epitrack_core::{clean::CleanReport, source::RawSource, view::GlobalSummary};
use epitrack_fetch::TableProvider;
use serde::Serialize;

use crate::{error::ApiError, load, respond};

#[derive(Debug, Serialize)]
pub struct SummaryBody<'a> {
  pub revision:   &'a str,
  pub rows:       usize,
  pub countries:  usize,
  pub first_date: Option<NaiveDate>,
  pub last_date:  Option<NaiveDate>,
  /// Absent for an empty table.
  pub global:     Option<GlobalSummary>,
}

/// `GET /summary`
pub async fn summary<S: RawSource>(
  State(provider): State<Arc<TableProvider<S>>>,
  headers: HeaderMap,
) -> Result<Response, ApiError> {
  let table = load(&provider).await?;
  let bounds = table.date_bounds();
  let body = SummaryBody {
    revision:   table.revision(),
    rows:       table.len(),
    countries:  table.countries().len(),
    first_date: bounds.map(|(first, _)| first),
    last_date:  bounds.map(|(_, last)| last),
    global:     table.global_summary(),
  };
  Ok(respond(&headers, &table, body))
}

#[derive(Debug, Serialize)]
pub struct RefreshBody {
  pub revision: String,
  pub rows:     usize,
  pub report:   CleanReport,
}

/// `POST /refresh`: invalidate the cache and rebuild now.
///
/// On failure the previous table stays published and keeps being served by
/// the read endpoints.
pub async fn refresh<S: RawSource>(
  State(provider): State<Arc<TableProvider<S>>>,
) -> Result<Json<RefreshBody>, ApiError> {
  let refresh = provider.refresh().await.map_err(ApiError::Unavailable)?;
  Ok(Json(RefreshBody {
    revision: refresh.table.revision().to_owned(),
    rows:     refresh.table.len(),
    report:   refresh.report,
  }))
}
