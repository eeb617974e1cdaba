//! Schema normalization: source column names → canonical fields.
//!
//! Every canonical field is recognised under two names: its canonical name
//! and the name used by the upstream (Our World in Data) CSV. A table that is
//! already in canonical form therefore normalizes to itself.

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::{SchemaError, raw::RawTable};

// ─── Fields ──────────────────────────────────────────────────────────────────

/// A column of the canonical schema.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
  LocationCode,
  RegionGroup,
  Country,
  Date,
  DailyCases,
  DailyDeaths,
  CumulativeCases,
  CumulativeDeaths,
  Population,
}

impl Field {
  pub const ALL: [Field; 9] = [
    Field::LocationCode,
    Field::RegionGroup,
    Field::Country,
    Field::Date,
    Field::DailyCases,
    Field::DailyDeaths,
    Field::CumulativeCases,
    Field::CumulativeDeaths,
    Field::Population,
  ];

  /// Rows cannot be placed in a time series without these.
  pub const IDENTITY: [Field; 2] = [Field::Country, Field::Date];

  pub fn canonical_name(self) -> &'static str { self.into() }

  /// Column name in the upstream CSV.
  pub fn source_name(self) -> &'static str {
    match self {
      Self::LocationCode => "iso_code",
      Self::RegionGroup => "continent",
      Self::Country => "location",
      Self::Date => "date",
      Self::DailyCases => "new_cases",
      Self::DailyDeaths => "new_deaths",
      Self::CumulativeCases => "total_cases",
      Self::CumulativeDeaths => "total_deaths",
      Self::Population => "population",
    }
  }

  /// Every header name some field is recognised under.
  pub fn column_names() -> impl Iterator<Item = &'static str> {
    Self::ALL
      .into_iter()
      .flat_map(|f| [f.canonical_name(), f.source_name()])
  }

  /// Resolve either a canonical or a source column name.
  pub fn from_name(name: &str) -> Option<Field> {
    let name = name.trim();
    Self::ALL
      .into_iter()
      .find(|f| f.canonical_name() == name || f.source_name() == name)
  }

  pub fn is_numeric(self) -> bool {
    matches!(
      self,
      Self::DailyCases
        | Self::DailyDeaths
        | Self::CumulativeCases
        | Self::CumulativeDeaths
        | Self::Population
    )
  }
}

// ─── Normalized table ────────────────────────────────────────────────────────

/// A raw table projected onto the required canonical fields.
///
/// Cells are still untyped; the [cleaner](crate::clean) parses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTable {
  fields:   Vec<Field>,
  rows:     Vec<Vec<Option<String>>>,
  revision: String,
}

impl NormalizedTable {
  /// Column order of [`Self::rows`].
  pub fn fields(&self) -> &[Field] { &self.fields }

  pub fn rows(&self) -> &[Vec<Option<String>>] { &self.rows }

  pub fn revision(&self) -> &str { &self.revision }

  /// Position of `field` within each row, if it was required.
  pub fn position(&self, field: Field) -> Option<usize> {
    self.fields.iter().position(|f| *f == field)
  }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

/// Restrict `raw` to the `required` fields, renamed to canonical names.
///
/// A field is matched by its canonical name first, then by its source name.
/// Duplicates in `required` are ignored. Fails with every missing field
/// listed; there is no partial mode.
pub fn normalize(
  raw: &RawTable,
  required: &[Field],
) -> Result<NormalizedTable, SchemaError> {
  let mut fields = Vec::with_capacity(required.len());
  let mut columns = Vec::with_capacity(required.len());
  let mut missing = Vec::new();

  for &field in required {
    if fields.contains(&field) {
      continue;
    }
    let column = raw
      .column(field.canonical_name())
      .or_else(|| raw.column(field.source_name()));
    match column {
      Some(idx) => {
        fields.push(field);
        columns.push(idx);
      }
      None => missing.push(field),
    }
  }

  if !missing.is_empty() {
    return Err(SchemaError { missing });
  }

  let rows = raw
    .rows
    .iter()
    .map(|row| {
      columns
        .iter()
        .map(|&idx| row.get(idx).cloned().flatten())
        .collect()
    })
    .collect();

  Ok(NormalizedTable {
    fields,
    rows,
    revision: raw.revision.clone(),
  })
}
