//! Constituency records — the single entity held by the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, geometry::Geometry};

/// Longest accepted value for any text column, in characters.
pub const MAX_TEXT_LEN: usize = 255;

/// Percentage of the vote per candidate or party.
///
/// No arithmetic constraint is enforced: values need not sum to 100 and are
/// not bounded to `[0, 100]`. Keys are kept sorted so serialisation is
/// deterministic.
pub type ElectionResults = BTreeMap<String, f64>;

/// One electoral constituency as persisted in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituencyRecord {
  pub id:                i64,
  pub name:              String,
  pub mp:                String,
  pub party:             String,
  pub impeachment_vote:  String,
  pub budget_vote:       String,
  pub county:            String,
  pub registered_voters: Option<u32>,
  pub updated_name:      Option<String>,
  #[serde(default)]
  pub election_results:  ElectionResults,
  pub geom:              Option<Geometry>,
}

impl ConstituencyRecord {
  /// The name to show to people: `updated_name` when set, else `name`.
  pub fn display_name(&self) -> &str {
    match self.updated_name.as_deref() {
      Some(n) if !n.trim().is_empty() => n,
      _ => &self.name,
    }
  }
}

/// Input for creating a record. The store assigns `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewConstituency {
  pub name:              String,
  pub mp:                String,
  pub party:             String,
  pub impeachment_vote:  String,
  pub budget_vote:       String,
  pub county:            String,
  #[serde(default)]
  pub registered_voters: Option<u32>,
  #[serde(default)]
  pub updated_name:      Option<String>,
  #[serde(default)]
  pub election_results:  ElectionResults,
  #[serde(default)]
  pub geom:              Option<Geometry>,
}

impl NewConstituency {
  /// Check field constraints before the record reaches the store.
  pub fn validate(&self) -> Result<()> {
    let required = [
      ("name", &self.name),
      ("mp", &self.mp),
      ("party", &self.party),
      ("impeachment_vote", &self.impeachment_vote),
      ("budget_vote", &self.budget_vote),
      ("county", &self.county),
    ];
    for (field, value) in required {
      if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
      }
      check_len(field, value)?;
    }

    if let Some(updated) = &self.updated_name {
      check_len("updated_name", updated)?;
    }

    if let Some((key, _)) = self
      .election_results
      .iter()
      .find(|(_, pct)| !pct.is_finite())
    {
      return Err(Error::Validation(format!(
        "election_results[{key:?}] is not a finite number"
      )));
    }

    if let Some(geom) = &self.geom {
      geom
        .validate()
        .map_err(|e| Error::Validation(format!("geom: {e}")))?;
    }

    Ok(())
  }
}

fn check_len(field: &str, value: &str) -> Result<()> {
  let len = value.chars().count();
  if len > MAX_TEXT_LEN {
    return Err(Error::Validation(format!(
      "{field} is {len} characters long (max {MAX_TEXT_LEN})"
    )));
  }
  Ok(())
}
