//! GeoJSON projection of constituency records.
//!
//! Each record becomes one `Feature`: its geometry is promoted to the
//! top-level `geometry` member and every other field lands in `properties`.
//! Field order is fixed by the struct definitions, so the same records always
//! serialise to the same bytes.

use bunge_core::{
  constituency::{ConstituencyRecord, ElectionResults},
  geometry::Geometry,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
  #[serde(rename = "type")]
  pub kind:     &'static str,
  pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
  #[serde(rename = "type")]
  pub kind:       &'static str,
  pub id:         i64,
  pub properties: FeatureProperties,
  /// `null` when the record has no boundary.
  pub geometry:   Option<Geometry>,
}

/// Every record field except the geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureProperties {
  pub id:                i64,
  pub name:              String,
  pub updated_name:      Option<String>,
  pub mp:                String,
  pub party:             String,
  pub impeachment_vote:  String,
  pub budget_vote:       String,
  pub county:            String,
  pub registered_voters: Option<u32>,
  pub election_results:  ElectionResults,
}

impl From<ConstituencyRecord> for Feature {
  fn from(r: ConstituencyRecord) -> Self {
    Feature {
      kind:       "Feature",
      id:         r.id,
      properties: FeatureProperties {
        id:                r.id,
        name:              r.name,
        updated_name:      r.updated_name,
        mp:                r.mp,
        party:             r.party,
        impeachment_vote:  r.impeachment_vote,
        budget_vote:       r.budget_vote,
        county:            r.county,
        registered_voters: r.registered_voters,
        election_results:  r.election_results,
      },
      geometry:   r.geom,
    }
  }
}

impl FeatureCollection {
  /// Project records in the order given; none are filtered out.
  pub fn from_records(records: Vec<ConstituencyRecord>) -> Self {
    FeatureCollection {
      kind:     "FeatureCollection",
      features: records.into_iter().map(Feature::from).collect(),
    }
  }
}
