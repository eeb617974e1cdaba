//! [`TableCache`]: the published canonical table, with an explicit TTL.
//!
//! Many readers, one writer. A table is only ever published whole, so a
//! reader sees either the previous table or the next one, never a partial
//! build.

use std::{sync::Arc, time::Duration};

use epitrack_core::table::CanonicalTable;
use tokio::{sync::RwLock, time::Instant};

#[derive(Debug, Clone)]
struct Entry {
  table:        Arc<CanonicalTable>,
  published_at: Instant,
  invalidated:  bool,
}

/// A single-slot cache of the current [`CanonicalTable`].
///
/// Constructed by the caller and injected into a
/// [`TableProvider`](crate::TableProvider); nothing is cached implicitly.
#[derive(Debug)]
pub struct TableCache {
  ttl:  Duration,
  slot: RwLock<Option<Entry>>,
}

impl TableCache {
  pub fn new(ttl: Duration) -> Self {
    Self {
      ttl,
      slot: RwLock::new(None),
    }
  }

  pub fn ttl(&self) -> Duration { self.ttl }

  /// The published table if it is younger than the TTL and has not been
  /// invalidated.
  pub async fn fresh(&self) -> Option<Arc<CanonicalTable>> {
    let slot = self.slot.read().await;
    slot
      .as_ref()
      .filter(|e| !e.invalidated && e.published_at.elapsed() < self.ttl)
      .map(|e| e.table.clone())
  }

  /// The published table regardless of age. Used to keep serving the
  /// previous table when a refresh fails.
  pub async fn current(&self) -> Option<Arc<CanonicalTable>> {
    self.slot.read().await.as_ref().map(|e| e.table.clone())
  }

  /// Replace the published table; the TTL restarts.
  pub async fn publish(&self, table: Arc<CanonicalTable>) {
    *self.slot.write().await = Some(Entry {
      table,
      published_at: Instant::now(),
      invalidated: false,
    });
  }

  /// Mark the published table stale so the next read refreshes. The table
  /// itself is kept as a fallback until a replacement is published.
  pub async fn invalidate(&self) {
    if let Some(entry) = self.slot.write().await.as_mut() {
      entry.invalidated = true;
    }
  }
}
