//! Inspection of a store file. Issues only `SELECT`s.
//!
//! Talks to SQLite directly rather than through the store so it can look at
//! rows the server would refuse to project.

use std::{collections::BTreeSet, fmt, path::Path};

use anyhow::{Context, Result, bail};
use bunge_store_sqlite::TABLE;
use rusqlite::{Connection, OpenFlags};

/// One row from the sample section.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
  pub name:    String,
  pub party:   String,
  pub results: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
  pub tables:            Vec<String>,
  pub total:             u64,
  pub sample:            Vec<SampleRow>,
  /// Distinct non-empty values of the `party` column, sorted.
  pub parties:           Vec<String>,
  /// Union of `election_results` keys across all rows, sorted.
  pub result_parties:    Vec<String>,
  /// Rows whose `election_results` is not a JSON object.
  pub malformed_results: usize,
}

/// Open an existing store file read-only. Never creates one.
pub fn open_existing(path: &Path) -> Result<Connection> {
  Connection::open_with_flags(
    path,
    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
  )
  .with_context(|| format!("opening {}", path.display()))
}

impl Report {
  pub fn gather(conn: &Connection, sample: usize) -> Result<Self> {
    let tables: Vec<String> = conn
      .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?
      .query_map([], |r| r.get(0))?
      .collect::<rusqlite::Result<_>>()?;

    if !tables.iter().any(|t| t == TABLE) {
      bail!("table {TABLE:?} not found; tables present: {tables:?}");
    }

    let total: i64 =
      conn.query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |r| r.get(0))?;

    let sample_rows: Vec<SampleRow> = conn
      .prepare(&format!(
        "SELECT name, party, election_results FROM {TABLE} ORDER BY id LIMIT ?1"
      ))?
      .query_map([sample as i64], |r| {
        Ok(SampleRow { name: r.get(0)?, party: r.get(1)?, results: r.get(2)? })
      })?
      .collect::<rusqlite::Result<_>>()?;

    let parties: Vec<String> = conn
      .prepare(&format!(
        "SELECT DISTINCT party FROM {TABLE}
         WHERE party IS NOT NULL AND party != ''
         ORDER BY party"
      ))?
      .query_map([], |r| r.get(0))?
      .collect::<rusqlite::Result<_>>()?;

    let raw_results: Vec<String> = conn
      .prepare(&format!(
        "SELECT election_results FROM {TABLE}
         WHERE election_results IS NOT NULL AND trim(election_results) != ''"
      ))?
      .query_map([], |r| r.get(0))?
      .collect::<rusqlite::Result<_>>()?;

    let mut result_parties = BTreeSet::new();
    let mut malformed_results = 0;
    for raw in &raw_results {
      match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => result_parties.extend(map.keys().cloned()),
        _ => {
          tracing::debug!(raw = %raw, "skipping unparseable election_results");
          malformed_results += 1;
        }
      }
    }

    Ok(Report {
      tables,
      total: total.max(0) as u64,
      sample: sample_rows,
      parties,
      result_parties: result_parties.into_iter().collect(),
      malformed_results,
    })
  }
}

impl fmt::Display for Report {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Tables: {}", self.tables.join(", "))?;
    writeln!(f, "Total constituencies: {}", self.total)?;

    if !self.sample.is_empty() {
      writeln!(f, "\nSample data:")?;
      for row in &self.sample {
        writeln!(
          f,
          "  Name: {}, Party: {}, Results: {}",
          row.name,
          row.party,
          row.results.as_deref().unwrap_or("-")
        )?;
      }
    }

    writeln!(f, "\nParties in constituencies:")?;
    for party in &self.parties {
      writeln!(f, "  - {party}")?;
    }

    writeln!(f, "\nParties from election_results:")?;
    for party in &self.result_parties {
      writeln!(f, "  - {party}")?;
    }
    if self.malformed_results > 0 {
      writeln!(f, "  ({} rows with malformed election_results skipped)", self.malformed_results)?;
    }
    Ok(())
  }
}
