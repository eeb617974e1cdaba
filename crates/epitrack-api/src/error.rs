//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// No canonical table could be loaded (all source locations failed, or
  /// the source lacks required fields).
  #[error("data unavailable: {0}")]
  Unavailable(#[source] epitrack_fetch::Error),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unavailable(e) => {
        tracing::error!(error = %e, "no canonical table available");
        StatusCode::SERVICE_UNAVAILABLE
      }
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
