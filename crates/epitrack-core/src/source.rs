//! The `RawSource` trait: the pipeline's only external collaborator.
//!
//! Implemented by `epitrack-fetch` (HTTP and file locations).

use std::future::Future;

use crate::{FetchError, raw::RawTable};

/// Something that can produce the raw dataset.
///
/// Returns `Send` futures so sources can be shared across a multi-threaded
/// runtime (e.g. behind `axum` handlers).
pub trait RawSource: Send + Sync {
  /// Fetch and decode the raw table. Failing locations are reported together
  /// in [`FetchError::Exhausted`].
  fn fetch_raw(
    &self,
  ) -> impl Future<Output = Result<RawTable, FetchError>> + Send + '_;
}
