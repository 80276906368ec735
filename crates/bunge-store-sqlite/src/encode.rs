//! Encoding and decoding between domain types and SQLite column values.
//!
//! `election_results` is stored as a compact JSON object. `geom` is stored as
//! compact GeoJSON; rows written by older tooling may hold WKT/EWKT instead,
//! which is decoded transparently.

use bunge_core::{
  constituency::{ConstituencyRecord, ElectionResults, NewConstituency},
  geometry::{Geometry, GeometryError},
};
use rusqlite::types::Value;

use crate::Result;

/// Column list shared by every read query, in [`RawConstituency`] order.
pub const COLUMNS: &str = "id, name, mp, party, impeachment_vote, budget_vote, county, \
                           registered_voters, updated_name, election_results, geom";

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Column values for one `INSERT`, owned so they can cross into the
/// connection thread.
pub struct EncodedConstituency {
  pub name:              String,
  pub mp:                String,
  pub party:             String,
  pub impeachment_vote:  String,
  pub budget_vote:       String,
  pub county:            String,
  pub registered_voters: Option<i64>,
  pub updated_name:      Option<String>,
  pub election_results:  String,
  pub geom:              Option<String>,
}

pub fn encode_new(input: &NewConstituency) -> Result<EncodedConstituency> {
  Ok(EncodedConstituency {
    name:              input.name.clone(),
    mp:                input.mp.clone(),
    party:             input.party.clone(),
    impeachment_vote:  input.impeachment_vote.clone(),
    budget_vote:       input.budget_vote.clone(),
    county:            input.county.clone(),
    registered_voters: input.registered_voters.map(i64::from),
    updated_name:      input.updated_name.clone(),
    election_results:  serde_json::to_string(&input.election_results)?,
    geom:              input
      .geom
      .as_ref()
      .map(Geometry::to_geojson_string)
      .transpose()?,
  })
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// Raw values read directly from a `constituencies` row.
///
/// Columns that legacy tooling is known to have written with the wrong
/// storage class are read untyped and checked in [`Self::into_record`].
pub struct RawConstituency {
  pub id:                i64,
  pub name:              String,
  pub mp:                String,
  pub party:             String,
  pub impeachment_vote:  String,
  pub budget_vote:       String,
  pub county:            String,
  pub registered_voters: Value,
  pub updated_name:      Option<String>,
  pub election_results:  Value,
  pub geom:              Value,
}

impl RawConstituency {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      name:              row.get(1)?,
      mp:                row.get(2)?,
      party:             row.get(3)?,
      impeachment_vote:  row.get(4)?,
      budget_vote:       row.get(5)?,
      county:            row.get(6)?,
      registered_voters: row.get(7)?,
      updated_name:      row.get(8)?,
      election_results:  row.get(9)?,
      geom:              row.get(10)?,
    })
  }

  pub fn into_record(self) -> Result<ConstituencyRecord> {
    let id = self.id;

    let registered_voters = match self.registered_voters {
      Value::Null => None,
      Value::Integer(v) => Some(u32::try_from(v).map_err(|_| {
        bunge_core::Error::InvalidRegisteredVoters { id, value: v }
      })?),
      other => {
        return Err(
          bunge_core::Error::UnexpectedColumnType {
            id,
            column: "registered_voters",
            found: storage_class(&other),
          }
          .into(),
        );
      }
    };

    let election_results = match self.election_results {
      Value::Null => ElectionResults::new(),
      Value::Text(text) => decode_election_results(id, Some(text.as_str()))?,
      other => {
        return Err(
          bunge_core::Error::InvalidElectionResults {
            id,
            reason: format!("stored as {}", storage_class(&other)),
          }
          .into(),
        );
      }
    };

    // Blank text is how some legacy rows spell "no boundary".
    let geom = match self.geom {
      Value::Null => None,
      Value::Text(text) if text.trim().is_empty() => None,
      Value::Text(text) => Some(
        Geometry::decode_stored(&text)
          .map_err(|source| bunge_core::Error::InvalidGeometry { id, source })?,
      ),
      other => {
        return Err(
          bunge_core::Error::InvalidGeometry {
            id,
            source: GeometryError::UnsupportedStorage(storage_class(&other)),
          }
          .into(),
        );
      }
    };

    Ok(ConstituencyRecord {
      id,
      name: self.name,
      mp: self.mp,
      party: self.party,
      impeachment_vote: self.impeachment_vote,
      budget_vote: self.budget_vote,
      county: self.county,
      registered_voters,
      updated_name: self.updated_name,
      election_results,
      geom,
    })
  }
}

fn storage_class(value: &Value) -> &'static str {
  match value {
    Value::Null => "NULL",
    Value::Integer(_) => "INTEGER",
    Value::Real(_) => "REAL",
    Value::Text(_) => "TEXT",
    Value::Blob(_) => "BLOB",
  }
}

fn decode_election_results(id: i64, text: Option<&str>) -> Result<ElectionResults> {
  match text.map(str::trim) {
    None | Some("") => Ok(ElectionResults::new()),
    Some(json) => serde_json::from_str(json).map_err(|e| {
      bunge_core::Error::InvalidElectionResults { id, reason: e.to_string() }.into()
    }),
  }
}
