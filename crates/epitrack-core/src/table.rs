//! [`CanonicalTable`]: the immutable, cleaned dataset behind every view.

use std::collections::BTreeMap;

use crate::{raw::RawTable, record::CanonicalRecord, schema::Field};

/// The cleaned dataset of one refresh.
///
/// Never mutated after construction; a refresh builds a new table and the
/// old one is dropped once no reader holds it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalTable {
  records:    Vec<CanonicalRecord>,
  /// Row indices per country, ordered by `(date, row)`.
  by_country: BTreeMap<String, Vec<usize>>,
  revision:   String,
}

impl CanonicalTable {
  pub fn new(
    records: Vec<CanonicalRecord>,
    revision: impl Into<String>,
  ) -> Self {
    let mut by_country: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, record) in records.iter().enumerate() {
      by_country.entry(record.country.clone()).or_default().push(idx);
    }
    // Stable: rows sharing a date keep table order.
    for rows in by_country.values_mut() {
      rows.sort_by_key(|&idx| records[idx].date);
    }

    Self {
      records,
      by_country,
      revision: revision.into(),
    }
  }

  /// All records in source row order.
  pub fn records(&self) -> &[CanonicalRecord] { &self.records }

  /// Content revision of the raw data this table was built from.
  pub fn revision(&self) -> &str { &self.revision }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  /// Records of `country` in `(date, row)` order. Empty for unknown names.
  pub(crate) fn country_rows<'a>(
    &'a self,
    country: &str,
  ) -> impl Iterator<Item = &'a CanonicalRecord> + use<'a> {
    self
      .by_country
      .get(country)
      .map(Vec::as_slice)
      .unwrap_or_default()
      .iter()
      .map(|&idx| &self.records[idx])
  }

  pub(crate) fn country_names(&self) -> impl Iterator<Item = &str> {
    self.by_country.keys().map(String::as_str)
  }

  /// Render the table back into raw form under canonical column names.
  ///
  /// `cfr` is derived and therefore omitted; feeding the result through the
  /// pipeline reproduces this table.
  pub fn to_raw(&self) -> RawTable {
    let headers = Field::ALL
      .iter()
      .map(|f| f.canonical_name().to_string())
      .collect();
    let rows = self
      .records
      .iter()
      .map(|r| {
        vec![
          r.location_code.clone(),
          r.region_group.clone(),
          Some(r.country.clone()),
          Some(r.date.format("%Y-%m-%d").to_string()),
          Some(r.daily_cases.to_string()),
          Some(r.daily_deaths.to_string()),
          Some(r.cumulative_cases.to_string()),
          Some(r.cumulative_deaths.to_string()),
          Some(r.population.to_string()),
        ]
      })
      .collect();
    RawTable::new(headers, rows).with_revision(self.revision.clone())
  }
}
