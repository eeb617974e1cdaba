//! Read-only views over a [`CanonicalTable`].
//!
//! Every view is recomputed from the table on request and borrows from it;
//! nothing here mutates or caches. Orderings are deterministic: ties are
//! always broken by source row order.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  metrics::{Metric, case_fatality_rate, metric_value},
  record::CanonicalRecord,
  table::CanonicalTable,
};

// ─── View types ──────────────────────────────────────────────────────────────

/// Optional inclusive date bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
  pub start: Option<NaiveDate>,
  pub end:   Option<NaiveDate>,
}

impl DateWindow {
  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start.is_none_or(|s| s <= date) && self.end.is_none_or(|e| date <= e)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
  pub date:  NaiveDate,
  pub value: f64,
}

/// One line of a comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySeries {
  pub country: String,
  pub points:  Vec<SeriesPoint>,
}

/// One bar of a latest-value comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryValue {
  pub country: String,
  pub date:    NaiveDate,
  pub value:   f64,
}

/// Totals across every location reporting on the most recent date.
///
/// Sums rows exactly as published: when aggregates such as "World" are kept
/// (see [`CleanPolicy::countries_only`](crate::clean::CleanPolicy)) they are
/// counted alongside their members.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalSummary {
  pub date:              NaiveDate,
  pub locations:         usize,
  pub daily_cases:       f64,
  pub daily_deaths:      f64,
  pub cumulative_cases:  f64,
  pub cumulative_deaths: f64,
  pub population:        f64,
  pub cfr:               f64,
}

// ─── Core queries ────────────────────────────────────────────────────────────

impl CanonicalTable {
  /// Records of `country`, ascending by date. Empty for an unknown country.
  pub fn time_series(&self, country: &str) -> Vec<&CanonicalRecord> {
    self.country_rows(country).collect()
  }

  /// The record of `country` with the greatest date, or `None` if the
  /// country has no records.
  ///
  /// If several records share that date, the first in table order wins,
  /// matching [`Self::snapshot`].
  pub fn latest(&self, country: &str) -> Option<&CanonicalRecord> {
    let rows = self.time_series(country);
    let max = rows.last()?.date;
    let first = rows.partition_point(|r| r.date < max);
    Some(rows[first])
  }

  /// Records with `start <= date <= end`, in table order. Empty when
  /// `start > end`.
  pub fn date_range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Vec<&CanonicalRecord> {
    if start > end {
      return Vec::new();
    }
    self
      .records()
      .iter()
      .filter(|r| start <= r.date && r.date <= end)
      .collect()
  }

  /// Records dated exactly `date`, at most one per country (first in table
  /// order wins).
  pub fn snapshot(&self, date: NaiveDate) -> Vec<&CanonicalRecord> {
    let mut seen = HashSet::new();
    self
      .records()
      .iter()
      .filter(|r| r.date == date && seen.insert(r.country.as_str()))
      .collect()
  }
}

// ─── Supplementary queries ───────────────────────────────────────────────────

impl CanonicalTable {
  /// Distinct country names, sorted.
  pub fn countries(&self) -> Vec<&str> { self.country_names().collect() }

  /// Earliest and latest date in the table.
  pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = self.records().iter().map(|r| r.date);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
  }

  /// [`Self::latest`] for every country, sorted by country.
  pub fn latest_per_country(&self) -> Vec<&CanonicalRecord> {
    self
      .country_names()
      .filter_map(|country| self.latest(country))
      .collect()
  }

  /// One series per requested country (in request order) of `metric` within
  /// `window`. Unknown countries yield an empty series.
  pub fn series(
    &self,
    countries: &[String],
    metric: Metric,
    per_capita: bool,
    window: DateWindow,
  ) -> Vec<CountrySeries> {
    countries
      .iter()
      .map(|country| CountrySeries {
        country: country.clone(),
        points:  self
          .country_rows(country)
          .filter(|r| window.contains(r.date))
          .map(|r| SeriesPoint {
            date:  r.date,
            value: metric_value(r, metric, per_capita),
          })
          .collect(),
      })
      .collect()
  }

  /// Latest value of `metric` per requested country. Countries without
  /// records are omitted.
  pub fn latest_values(
    &self,
    countries: &[String],
    metric: Metric,
    per_capita: bool,
  ) -> Vec<CountryValue> {
    countries
      .iter()
      .filter_map(|country| self.latest(country))
      .map(|r| CountryValue {
        country: r.country.clone(),
        date:    r.date,
        value:   metric_value(r, metric, per_capita),
      })
      .collect()
  }

  /// Totals over the snapshot of the most recent date.
  pub fn global_summary(&self) -> Option<GlobalSummary> {
    let (_, date) = self.date_bounds()?;
    let rows = self.snapshot(date);

    let mut summary = GlobalSummary {
      date,
      locations: rows.len(),
      daily_cases: 0.0,
      daily_deaths: 0.0,
      cumulative_cases: 0.0,
      cumulative_deaths: 0.0,
      population: 0.0,
      cfr: 0.0,
    };
    for r in rows {
      summary.daily_cases += r.daily_cases;
      summary.daily_deaths += r.daily_deaths;
      summary.cumulative_cases += r.cumulative_cases;
      summary.cumulative_deaths += r.cumulative_deaths;
      summary.population += r.population;
    }
    summary.cfr =
      case_fatality_rate(summary.cumulative_deaths, summary.cumulative_cases);
    Some(summary)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2021, 1, d).unwrap() }

  fn rec(country: &str, d: u32, cases: f64) -> CanonicalRecord {
    CanonicalRecord {
      location_code: None,
      region_group: None,
      country: country.into(),
      date: day(d),
      daily_cases: cases,
      daily_deaths: 0.0,
      cumulative_cases: cases,
      cumulative_deaths: cases / 10.0,
      population: 1_000.0,
      cfr: case_fatality_rate(cases / 10.0, cases),
    }
  }

  fn sample() -> CanonicalTable {
    CanonicalTable::new(
      vec![
        rec("B", 3, 30.0),
        rec("A", 2, 20.0),
        rec("B", 1, 10.0),
        rec("A", 1, 10.0),
        rec("B", 2, 20.0),
        rec("A", 2, 21.0),
      ],
      "rev",
    )
  }

  #[test]
  fn time_series_is_sorted_and_stable() {
    let t = sample();
    let a = t.time_series("A");
    let cases: Vec<_> = a.iter().map(|r| r.daily_cases).collect();
    assert_eq!(cases, [10.0, 20.0, 21.0]);
    assert!(a.windows(2).all(|w| w[0].date <= w[1].date));
    assert_eq!(t.time_series("A"), a);
  }

  #[test]
  fn time_series_unknown_country_is_empty() {
    assert!(sample().time_series("Atlantis").is_empty());
  }

  #[test]
  fn latest_picks_max_date_first_encountered() {
    let t = sample();
    assert_eq!(t.latest("B").unwrap().date, day(3));
    let a = t.latest("A").unwrap();
    assert_eq!(a.date, day(2));
    assert_eq!(a.daily_cases, 20.0);
    assert!(t.latest("Atlantis").is_none());
  }

  #[test]
  fn latest_agrees_with_snapshot() {
    let t = sample();
    let snap = t.snapshot(day(2));
    let a = snap.iter().find(|r| r.country == "A").unwrap();
    assert_eq!(Some(*a), t.latest("A"));
  }

  #[test]
  fn date_range_is_inclusive() {
    let t = sample();
    let rows = t.date_range(day(1), day(2));
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|r| r.date <= day(2)));
    assert_eq!(t.date_range(day(2), day(2)).len(), 3);
  }

  #[test]
  fn date_range_reversed_is_empty() {
    assert!(sample().date_range(day(3), day(1)).is_empty());
  }

  #[test]
  fn snapshot_has_one_record_per_country() {
    let t = sample();
    let snap = t.snapshot(day(2));
    assert_eq!(snap.len(), 2);
    let countries: HashSet<_> = snap.iter().map(|r| &r.country).collect();
    assert_eq!(countries.len(), snap.len());
    // Table order: A (row 1) before B (row 4).
    assert_eq!(snap[0].country, "A");
    assert_eq!(snap[0].daily_cases, 20.0);
    assert!(t.snapshot(day(9)).is_empty());
  }

  #[test]
  fn countries_and_bounds() {
    let t = sample();
    assert_eq!(t.countries(), ["A", "B"]);
    assert_eq!(t.date_bounds(), Some((day(1), day(3))));
    assert_eq!(CanonicalTable::default().date_bounds(), None);
  }

  #[test]
  fn latest_per_country_sorted_by_name() {
    let t = sample();
    let latest: Vec<_> = t
      .latest_per_country()
      .iter()
      .map(|r| (r.country.clone(), r.date))
      .collect();
    assert_eq!(latest, [("A".to_string(), day(2)), ("B".to_string(), day(3))]);
  }

  #[test]
  fn series_respects_window_and_normalization() {
    let t = sample();
    let window = DateWindow {
      start: Some(day(2)),
      end:   None,
    };
    let series = t.series(
      &["B".to_string(), "Atlantis".to_string()],
      Metric::DailyCases,
      true,
      window,
    );
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].points, vec![
      SeriesPoint {
        date:  day(2),
        value: 2_000.0,
      },
      SeriesPoint {
        date:  day(3),
        value: 3_000.0,
      },
    ]);
    assert!(series[1].points.is_empty());
  }

  #[test]
  fn latest_values_skip_unknown_countries() {
    let t = sample();
    let values = t.latest_values(
      &["B".to_string(), "Nowhere".to_string(), "A".to_string()],
      Metric::Cfr,
      true,
    );
    let names: Vec<_> = values.iter().map(|v| v.country.as_str()).collect();
    assert_eq!(names, ["B", "A"]);
    assert_eq!(values[0].value, 10.0);
  }

  #[test]
  fn global_summary_uses_latest_date() {
    let summary = sample().global_summary().unwrap();
    assert_eq!(summary.date, day(3));
    assert_eq!(summary.locations, 1);
    assert_eq!(summary.cumulative_cases, 30.0);
    assert_eq!(summary.cfr, 10.0);
    assert!(CanonicalTable::default().global_summary().is_none());
  }
}
