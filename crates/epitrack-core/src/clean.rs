//! Field cleaning: typed parsing, identity checks, zero-filling.
//!
//! Row-level defects never fail the dataset. A defective row is dropped and
//! counted in the [`CleanReport`]; nothing is retried.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
  metrics::case_fatality_rate,
  record::CanonicalRecord,
  schema::{Field, NormalizedTable},
};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Optional row filters applied on top of the identity checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanPolicy {
  /// Keep only rows whose `location_code` is three ASCII letters. OWID
  /// aggregates (`OWID_WRL`, `OWID_EUR`, …) and rows without a code are
  /// dropped. So are countries that only carry an OWID-specific code, such
  /// as Kosovo (`OWID_KOS`).
  pub countries_only:           bool,
  /// Drop rows that publish a negative `cumulative_cases` correction.
  pub drop_negative_cumulative: bool,
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Why a row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowDefect {
  MissingCountry,
  MissingDate,
  MalformedDate,
  AggregateLocation,
  NegativeCumulative,
}

/// Row accounting for one cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
  pub input_rows:          usize,
  pub kept_rows:           usize,
  pub missing_country:     usize,
  pub missing_date:        usize,
  pub malformed_date:      usize,
  pub aggregate_location:  usize,
  pub negative_cumulative: usize,
  /// Numeric cells that were null, unparsable or non-finite and became `0`.
  pub zero_filled:         usize,
}

impl CleanReport {
  pub fn dropped_rows(&self) -> usize { self.input_rows - self.kept_rows }

  fn record(&mut self, defect: RowDefect) {
    let counter = match defect {
      RowDefect::MissingCountry => &mut self.missing_country,
      RowDefect::MissingDate => &mut self.missing_date,
      RowDefect::MalformedDate => &mut self.malformed_date,
      RowDefect::AggregateLocation => &mut self.aggregate_location,
      RowDefect::NegativeCumulative => &mut self.negative_cumulative,
    };
    *counter += 1;
  }
}

// ─── Cleaning ────────────────────────────────────────────────────────────────

/// Column positions resolved once per pass.
struct Layout {
  location_code:     Option<usize>,
  region_group:      Option<usize>,
  country:           Option<usize>,
  date:              Option<usize>,
  daily_cases:       Option<usize>,
  daily_deaths:      Option<usize>,
  cumulative_cases:  Option<usize>,
  cumulative_deaths: Option<usize>,
  population:        Option<usize>,
}

impl Layout {
  fn of(table: &NormalizedTable) -> Self {
    Self {
      location_code:     table.position(Field::LocationCode),
      region_group:      table.position(Field::RegionGroup),
      country:           table.position(Field::Country),
      date:              table.position(Field::Date),
      daily_cases:       table.position(Field::DailyCases),
      daily_deaths:      table.position(Field::DailyDeaths),
      cumulative_cases:  table.position(Field::CumulativeCases),
      cumulative_deaths: table.position(Field::CumulativeDeaths),
      population:        table.position(Field::Population),
    }
  }
}

/// Turn normalized rows into canonical records.
///
/// Output preserves input row order. Fields absent from the normalized table
/// read as null: identity fields then drop the row, numerics become `0`.
pub fn clean(
  table: &NormalizedTable,
  policy: CleanPolicy,
) -> (Vec<CanonicalRecord>, CleanReport) {
  let layout = Layout::of(table);
  let mut report = CleanReport {
    input_rows: table.len(),
    ..CleanReport::default()
  };
  let mut records = Vec::with_capacity(table.len());

  for row in table.rows() {
    match clean_row(row, &layout, policy, &mut report.zero_filled) {
      Ok(record) => records.push(record),
      Err(defect) => report.record(defect),
    }
  }

  report.kept_rows = records.len();
  (records, report)
}

fn clean_row(
  row: &[Option<String>],
  layout: &Layout,
  policy: CleanPolicy,
  zero_filled: &mut usize,
) -> Result<CanonicalRecord, RowDefect> {
  let text = |pos: Option<usize>| -> Option<&str> {
    pos
      .and_then(|p| row.get(p))
      .and_then(|c| c.as_deref())
      .map(str::trim)
      .filter(|s| !s.is_empty())
  };

  let country = text(layout.country).ok_or(RowDefect::MissingCountry)?;
  let date = text(layout.date).ok_or(RowDefect::MissingDate)?;
  let date = parse_date(date).ok_or(RowDefect::MalformedDate)?;

  let location_code = text(layout.location_code);
  if policy.countries_only && !location_code.is_some_and(is_country_code) {
    return Err(RowDefect::AggregateLocation);
  }

  let mut numeric = |pos: Option<usize>| -> f64 {
    // A column that was never required is absent, not null.
    let Some(pos) = pos else { return 0.0 };
    match text(Some(pos)).and_then(|s| s.parse::<f64>().ok()) {
      Some(v) if v.is_finite() => v,
      _ => {
        *zero_filled += 1;
        0.0
      }
    }
  };

  let daily_cases = numeric(layout.daily_cases);
  let daily_deaths = numeric(layout.daily_deaths);
  let cumulative_cases = numeric(layout.cumulative_cases);
  let cumulative_deaths = numeric(layout.cumulative_deaths);
  let population = numeric(layout.population);

  if policy.drop_negative_cumulative && cumulative_cases < 0.0 {
    return Err(RowDefect::NegativeCumulative);
  }

  Ok(CanonicalRecord {
    location_code: location_code.map(str::to_string),
    region_group: text(layout.region_group).map(str::to_string),
    country: country.to_string(),
    date,
    daily_cases,
    daily_deaths,
    cumulative_cases,
    cumulative_deaths,
    population,
    cfr: case_fatality_rate(cumulative_deaths, cumulative_cases),
  })
}

/// Parse a calendar date, tolerating a trailing time component.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
  let s = s.trim();
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .or_else(|| {
      NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|dt| dt.date())
    })
}

fn is_country_code(code: &str) -> bool {
  code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic())
}
