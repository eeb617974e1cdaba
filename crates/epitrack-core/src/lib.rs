//! Core types and the metrics transformation pipeline for Epitrack.
//!
//! No HTTP, file or async-runtime dependencies. A raw country/date table goes
//! in and an immutable [`CanonicalTable`](table::CanonicalTable) with derived
//! metrics comes out. Every read-only view is computed from that table on
//! request.
//!
//! ```text
//! RawTable ──normalize──▶ NormalizedTable ──clean──▶ CanonicalTable ──▶ views
//! ```

pub mod clean;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod raw;
pub mod record;
pub mod schema;
pub mod source;
pub mod table;
pub mod view;

pub use error::{Error, FetchError, FetchFailure, Result, SchemaError};
