//! The parameterised normalize → clean → derive pipeline.

use serde::{Deserialize, Serialize};

use crate::{
  SchemaError,
  clean::{self, CleanPolicy, CleanReport},
  raw::RawTable,
  schema::{self, Field},
  table::CanonicalTable,
};

/// Pipeline parameters, deserialised from the `[pipeline]` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  /// Fields the source must provide. [`Field::IDENTITY`] is always added.
  pub required_fields:          Vec<Field>,
  pub countries_only:           bool,
  pub drop_negative_cumulative: bool,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      required_fields:          Field::ALL.to_vec(),
      countries_only:           false,
      drop_negative_cumulative: false,
    }
  }
}

impl PipelineConfig {
  /// The effective required-field list: identity fields first, then the
  /// configured fields, plus `location_code` when filtering to countries.
  pub fn required(&self) -> Vec<Field> {
    let mut fields = Field::IDENTITY.to_vec();
    if self.countries_only {
      fields.push(Field::LocationCode);
    }
    for &field in &self.required_fields {
      if !fields.contains(&field) {
        fields.push(field);
      }
    }
    fields
  }

  pub fn policy(&self) -> CleanPolicy {
    CleanPolicy {
      countries_only:           self.countries_only,
      drop_negative_cumulative: self.drop_negative_cumulative,
    }
  }
}

/// A finished pipeline run.
#[derive(Debug, Clone)]
pub struct Build {
  pub table:  CanonicalTable,
  pub report: CleanReport,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
  config: PipelineConfig,
}

impl Pipeline {
  pub fn new(config: PipelineConfig) -> Self { Self { config } }

  pub fn config(&self) -> &PipelineConfig { &self.config }

  /// Build a canonical table from `raw`.
  ///
  /// Fails only when required fields are missing; nothing is built in that
  /// case. Dropped rows are reported, not fatal.
  pub fn run(&self, raw: &RawTable) -> Result<Build, SchemaError> {
    let normalized = schema::normalize(raw, &self.config.required())?;
    let (records, report) = clean::clean(&normalized, self.config.policy());

    if report.dropped_rows() > 0 {
      tracing::debug!(
        dropped = report.dropped_rows(),
        missing_country = report.missing_country,
        missing_date = report.missing_date,
        malformed_date = report.malformed_date,
        aggregate_location = report.aggregate_location,
        negative_cumulative = report.negative_cumulative,
        "dropped rows while cleaning"
      );
    }

    Ok(Build {
      table: CanonicalTable::new(records, normalized.revision()),
      report,
    })
  }
}
