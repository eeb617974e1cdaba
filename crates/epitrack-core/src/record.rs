//! The canonical record: one country on one day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A cleaned row with every numeric field present and the CFR derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
  /// ISO-like region identifier; OWID aggregates use `OWID_*` codes.
  pub location_code:     Option<String>,
  /// Continent or other grouping.
  pub region_group:      Option<String>,
  pub country:           String,
  pub date:              NaiveDate,
  pub daily_cases:       f64,
  pub daily_deaths:      f64,
  pub cumulative_cases:  f64,
  pub cumulative_deaths: f64,
  pub population:        f64,
  /// Case-fatality rate in percent.
  pub cfr:               f64,
}
