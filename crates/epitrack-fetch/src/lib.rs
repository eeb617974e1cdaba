//! Raw data acquisition and table lifecycle for Epitrack.
//!
//! - [`FallbackSource`]: an ordered list of [`Location`]s, first success
//!   wins, every failure reported otherwise.
//! - [`TableCache`]: an explicit, injectable cache of the published
//!   [`CanonicalTable`](epitrack_core::table::CanonicalTable) with a TTL.
//! - [`TableProvider`]: ties a source, the pipeline and the cache together.

pub mod cache;
pub mod error;
pub mod location;
pub mod provider;
pub mod source;

pub use cache::TableCache;
pub use error::{Error, Result};
pub use location::Location;
pub use provider::{Refresh, TableProvider};
pub use source::{FallbackSource, SourceConfig};
