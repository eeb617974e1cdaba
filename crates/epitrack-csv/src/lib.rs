//! CSV codec for Epitrack.
//!
//! Decodes the bytes of a country/date CSV (Our World in Data layout, or the
//! canonical layout) into a [`RawTable`]. Pure synchronous; no HTTP or
//! file-system dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! let csv = b"location,date,total_cases\nFrance,2021-01-01,100\n";
//! let table = epitrack_csv::decode(csv).unwrap();
//! println!("{} rows, revision {}", table.len(), table.revision);
//! ```

pub mod error;

pub use error::{Error, Result};
use epitrack_core::raw::RawTable;
use sha2::{Digest, Sha256};

/// Decode `input` into a [`RawTable`], keeping every column.
///
/// The first record is the header. Empty cells become `None`; ragged rows
/// are accepted (missing trailing cells read as `None`). The table's
/// revision is the [`revision`] of `input`.
pub fn decode(input: &[u8]) -> Result<RawTable> { decode_inner(input, None) }

/// Like [`decode`], but keeps only the columns whose trimmed header is in
/// `columns`, in source order. Cells of other columns are never allocated.
pub fn decode_columns(input: &[u8], columns: &[&str]) -> Result<RawTable> {
  decode_inner(input, Some(columns))
}

fn decode_inner(input: &[u8], columns: Option<&[&str]>) -> Result<RawTable> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_reader(input);

  let all_headers: Vec<String> = reader
    .headers()?
    .iter()
    .map(|h| h.trim().to_string())
    .collect();
  if all_headers.iter().all(String::is_empty) {
    return Err(Error::MissingHeader);
  }

  let (positions, headers): (Vec<usize>, Vec<String>) = all_headers
    .into_iter()
    .enumerate()
    .filter(|(_, h)| columns.is_none_or(|keep| keep.contains(&h.as_str())))
    .unzip();

  let mut rows = Vec::new();
  let mut record = csv::StringRecord::new();
  while reader.read_record(&mut record)? {
    rows.push(
      positions
        .iter()
        .map(|&i| record.get(i).filter(|c| !c.is_empty()).map(str::to_string))
        .collect(),
    );
  }

  Ok(RawTable::new(headers, rows).with_revision(revision(input)))
}

/// Hex SHA-256 of `input`; identical bytes always give the same revision.
pub fn revision(input: &[u8]) -> String {
  hex::encode(Sha256::digest(input))
}
