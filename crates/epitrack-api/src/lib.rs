//! JSON API for Epitrack.
//!
//! Exposes an axum [`Router`] over a [`TableProvider`]. Every read handler
//! loads the current canonical table (refreshing it if the cache expired) and
//! computes its view on the spot. Responses built from a table carry the
//! table revision as an `ETag`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", epitrack_api::api_router(provider.clone()))
//! ```

pub mod compare;
pub mod countries;
pub mod error;
pub mod status;
pub mod views;

use std::sync::Arc;

use axum::{
  Json,
  Router,
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
  routing::{get, post},
};
use epitrack_core::{source::RawSource, table::CanonicalTable};
use epitrack_fetch::TableProvider;
use serde::Serialize;

pub use error::ApiError;

/// Build the API router for `provider`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(provider: Arc<TableProvider<S>>) -> Router<()>
where
  S: RawSource + 'static,
{
  Router::new()
    // Countries
    .route("/countries", get(countries::list::<S>))
    .route("/countries/{country}/series", get(countries::series::<S>))
    .route("/countries/{country}/latest", get(countries::latest::<S>))
    // Cross-country views
    .route("/range", get(views::range::<S>))
    .route("/snapshot/{date}", get(views::snapshot::<S>))
    .route("/compare", get(compare::series::<S>))
    .route("/latest", get(compare::latest::<S>))
    // Status
    .route("/summary", get(status::summary::<S>))
    .route("/refresh", post(status::refresh::<S>))
    .with_state(provider)
}

// ─── Shared helpers ──────────────────────────────────────────────────────────

/// Load the current table or fail with `503`.
async fn load<S: RawSource>(
  provider: &TableProvider<S>,
) -> Result<Arc<CanonicalTable>, ApiError> {
  provider.table().await.map_err(ApiError::Unavailable)
}

/// Serialise `body` with the table revision as `ETag`, answering
/// `304 Not Modified` when the client already holds that revision.
fn respond<T: Serialize>(
  request_headers: &HeaderMap,
  table: &CanonicalTable,
  body: T,
) -> Response {
  let etag = (!table.revision().is_empty())
    .then(|| HeaderValue::from_str(&format!("\"{}\"", table.revision())).ok())
    .flatten();

  let Some(etag) = etag else {
    return Json(body).into_response();
  };

  let not_modified = request_headers
    .get_all(header::IF_NONE_MATCH)
    .iter()
    .any(|v| if_none_match(v, &etag));
  if not_modified {
    return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
  }
  ([(header::ETAG, etag)], Json(body)).into_response()
}

/// Weak comparison of an `If-None-Match` value against `etag`. `*` matches
/// anything; each list entry is compared with any `W/` prefix removed.
fn if_none_match(value: &HeaderValue, etag: &HeaderValue) -> bool {
  let (Ok(value), Ok(etag)) = (value.to_str(), etag.to_str()) else {
    return false;
  };
  value.split(',').map(str::trim).any(|tag| {
    tag == "*" || tag.strip_prefix("W/").unwrap_or(tag) == etag
  })
}

/// Split a comma-separated country list, dropping blanks.
fn split_list(s: &str) -> Vec<String> {
  s.split(',')
    .map(str::trim)
    .filter(|c| !c.is_empty())
    .map(str::to_owned)
    .collect()
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests;
