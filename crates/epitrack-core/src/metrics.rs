//! Derived metrics: case-fatality rate and per-100k normalization.
//!
//! All functions are pure and total: no input produces NaN or infinity.

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::record::CanonicalRecord;

/// Scale factor for population-normalized rates.
pub const PER_CAPITA_SCALE: f64 = 100_000.0;

/// `cumulative_deaths / cumulative_cases * 100`, or `0` when there are no
/// (positive) cases. Clamped to `[0, 100]`.
pub fn case_fatality_rate(
  cumulative_deaths: f64,
  cumulative_cases: f64,
) -> f64 {
  if !(cumulative_cases > 0.0) || !cumulative_cases.is_finite() {
    return 0.0;
  }
  let rate = cumulative_deaths * 100.0 / cumulative_cases;
  if rate.is_finite() { rate.clamp(0.0, 100.0) } else { 0.0 }
}

/// `value / population * 100_000`, or `0` when population is zero, negative
/// or not finite.
pub fn per_100k(value: f64, population: f64) -> f64 {
  if !(population > 0.0) || !population.is_finite() {
    return 0.0;
  }
  let rate = value * PER_CAPITA_SCALE / population;
  if rate.is_finite() { rate } else { 0.0 }
}

// ─── Metric selection ────────────────────────────────────────────────────────

/// A chartable numeric column of a [`CanonicalRecord`].
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
  #[default]
  DailyCases,
  DailyDeaths,
  CumulativeCases,
  CumulativeDeaths,
  Cfr,
}

impl Metric {
  /// The raw value of this metric in `record`.
  pub fn raw(self, record: &CanonicalRecord) -> f64 {
    match self {
      Self::DailyCases => record.daily_cases,
      Self::DailyDeaths => record.daily_deaths,
      Self::CumulativeCases => record.cumulative_cases,
      Self::CumulativeDeaths => record.cumulative_deaths,
      Self::Cfr => record.cfr,
    }
  }

  /// Ratios are already comparable across regions and are never scaled by
  /// population.
  pub fn is_ratio(self) -> bool { matches!(self, Self::Cfr) }
}

/// The value of `metric` in `record`, optionally per 100k population.
pub fn metric_value(
  record: &CanonicalRecord,
  metric: Metric,
  per_capita: bool,
) -> f64 {
  let raw = metric.raw(record);
  if per_capita && !metric.is_ratio() {
    per_100k(raw, record.population)
  } else {
    raw
  }
}
