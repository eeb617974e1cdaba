//! [`TableProvider`]: fetch, build and publish canonical tables on demand.

use std::sync::{
  Arc,
  atomic::{AtomicU64, Ordering},
};

use epitrack_core::{
  clean::CleanReport,
  pipeline::Pipeline,
  source::RawSource,
  table::CanonicalTable,
};
use tokio::sync::Mutex;

use crate::{Error, Result, cache::TableCache};

/// The outcome of a successful rebuild.
#[derive(Debug, Clone)]
pub struct Refresh {
  pub table:  Arc<CanonicalTable>,
  pub report: CleanReport,
}

/// Serves the current canonical table, refreshing it through `source` when
/// the cache has expired.
///
/// Refreshes are serialised: concurrent readers that find the cache stale
/// wait for a single download instead of starting their own, whether that
/// download succeeds or fails. A failed refresh publishes nothing; the
/// previous table stays in effect.
pub struct TableProvider<S> {
  source:   S,
  pipeline: Pipeline,
  cache:    Arc<TableCache>,
  /// Finished rebuild attempts, successful or not.
  attempts: AtomicU64,
  /// Held for the duration of a rebuild. Holds the reason the last attempt
  /// failed, if it did.
  refresh:  Mutex<Option<String>>,
}

impl<S: RawSource> TableProvider<S> {
  pub fn new(source: S, pipeline: Pipeline, cache: Arc<TableCache>) -> Self {
    Self {
      source,
      pipeline,
      cache,
      attempts: AtomicU64::new(0),
      refresh: Mutex::new(None),
    }
  }

  pub fn cache(&self) -> &TableCache { &self.cache }

  pub fn pipeline(&self) -> &Pipeline { &self.pipeline }

  /// The current table: cached if fresh, otherwise rebuilt. When the
  /// rebuild fails and an older table exists, the older table is returned.
  ///
  /// A caller that waited on another caller's rebuild takes that outcome
  /// instead of fetching again.
  pub async fn table(&self) -> Result<Arc<CanonicalTable>> {
    if let Some(table) = self.cache.fresh().await {
      return Ok(table);
    }

    let seen = self.attempts.load(Ordering::Acquire);
    let mut last_failure = self.refresh.lock().await;
    if let Some(table) = self.cache.fresh().await {
      return Ok(table);
    }
    if self.attempts.load(Ordering::Acquire) != seen {
      if let Some(stale) = self.cache.current().await {
        return Ok(stale);
      }
      if let Some(reason) = last_failure.as_ref() {
        return Err(Error::RecentFailure(reason.clone()));
      }
    }

    match self.attempt(&mut last_failure).await {
      Ok(refresh) => Ok(refresh.table),
      Err(e) => match self.cache.current().await {
        Some(stale) => {
          tracing::warn!(
            error = %e,
            revision = stale.revision(),
            "refresh failed; serving previous table"
          );
          Ok(stale)
        }
        None => Err(e),
      },
    }
  }

  /// Invalidate the cache and rebuild now. Errors are returned to the
  /// caller; the previous table (if any) remains available through
  /// [`Self::table`].
  pub async fn refresh(&self) -> Result<Refresh> {
    let mut last_failure = self.refresh.lock().await;
    self.cache.invalidate().await;
    self.attempt(&mut last_failure).await
  }

  /// Rebuild and record the outcome. Must be called with the refresh lock
  /// held.
  async fn attempt(
    &self,
    last_failure: &mut Option<String>,
  ) -> Result<Refresh> {
    let result = self.rebuild().await;
    *last_failure = result.as_ref().err().map(ToString::to_string);
    self.attempts.fetch_add(1, Ordering::Release);
    result
  }

  async fn rebuild(&self) -> Result<Refresh> {
    let raw = self.source.fetch_raw().await?;

    let pipeline = self.pipeline.clone();
    let build = tokio::task::spawn_blocking(move || pipeline.run(&raw)).await??;

    let table = Arc::new(build.table);
    self.cache.publish(table.clone()).await;
    tracing::info!(
      revision = table.revision(),
      rows = table.len(),
      dropped = build.report.dropped_rows(),
      "published canonical table"
    );

    Ok(Refresh {
      table,
      report: build.report,
    })
  }
}
