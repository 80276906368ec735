//! Constituency boundary geometry.
//!
//! Boundaries are polygons or multipolygons in WGS84 (EPSG:4326) with
//! positions in longitude/latitude order. The serde representation is the
//! GeoJSON geometry object itself, so a [`Geometry`] serialises straight into
//! `{"type": ..., "coordinates": ...}`.
//!
//! Older rows may hold the boundary as WKT/EWKT text instead of GeoJSON;
//! [`Geometry::decode_stored`] accepts both.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wkt;

/// The only spatial reference system the store accepts.
pub const WGS84_SRID: i64 = 4326;

/// `[lon, lat]` or `[lon, lat, z]`.
pub type Position = Vec<f64>;

/// A closed linear ring; the first position equals the last.
pub type Ring = Vec<Position>;

/// A polygon is an exterior ring followed by zero or more holes.
pub type PolygonRings = Vec<Ring>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
  Polygon(PolygonRings),
  MultiPolygon(Vec<PolygonRings>),
}

#[derive(Debug, Error)]
pub enum GeometryError {
  #[error("malformed GeoJSON geometry: {0}")]
  Json(#[from] serde_json::Error),

  #[error("malformed WKT at byte {offset}: {message}")]
  Wkt { offset: usize, message: String },

  #[error("unsupported SRID {0}; only EPSG:4326 is accepted")]
  UnsupportedSrid(i64),

  #[error("geometry is empty")]
  Empty,

  /// The stored value is not text, e.g. a SpatiaLite binary blob.
  #[error("geometry stored as {0}; expected GeoJSON or WKT text")]
  UnsupportedStorage(&'static str),

  #[error("polygon {polygon} has no rings")]
  EmptyPolygon { polygon: usize },

  #[error("polygon {polygon} ring {ring} has {len} positions; at least 4 are required")]
  RingTooShort { polygon: usize, ring: usize, len: usize },

  #[error("polygon {polygon} ring {ring} is not closed")]
  RingNotClosed { polygon: usize, ring: usize },

  #[error("position has {0} ordinates; expected 2 or 3")]
  BadPosition(usize),

  #[error("position contains a non-finite ordinate")]
  NonFinite,

  #[error("position ({lon}, {lat}) is outside WGS84 bounds")]
  OutOfBounds { lon: f64, lat: f64 },
}

impl Geometry {
  /// Parse and validate a GeoJSON geometry object.
  pub fn from_geojson(text: &str) -> Result<Self, GeometryError> {
    let geom: Geometry = serde_json::from_str(text)?;
    geom.validate()?;
    Ok(geom)
  }

  /// Parse and validate WKT or EWKT (`SRID=4326;MULTIPOLYGON(...)`).
  pub fn from_wkt(text: &str) -> Result<Self, GeometryError> {
    let geom = wkt::parse(text)?;
    geom.validate()?;
    Ok(geom)
  }

  /// Decode a geometry column value in whichever text form it was stored.
  pub fn decode_stored(text: &str) -> Result<Self, GeometryError> {
    if text.trim_start().starts_with('{') {
      Self::from_geojson(text)
    } else {
      Self::from_wkt(text)
    }
  }

  /// Canonical storage form: compact GeoJSON.
  pub fn to_geojson_string(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(self)
  }

  pub fn type_name(&self) -> &'static str {
    match self {
      Self::Polygon(_) => "Polygon",
      Self::MultiPolygon(_) => "MultiPolygon",
    }
  }

  /// Every polygon in the geometry, in order.
  pub fn polygons(&self) -> Vec<&PolygonRings> {
    match self {
      Self::Polygon(p) => vec![p],
      Self::MultiPolygon(ps) => ps.iter().collect(),
    }
  }

  /// Total number of positions across all rings, closing positions included.
  pub fn vertex_count(&self) -> usize {
    self
      .polygons()
      .into_iter()
      .flat_map(|p| p.iter())
      .map(Vec::len)
      .sum()
  }

  /// Check ring structure and coordinate bounds.
  ///
  /// Self-intersection is not tested.
  pub fn validate(&self) -> Result<(), GeometryError> {
    let polygons = self.polygons();
    if polygons.is_empty() {
      return Err(GeometryError::Empty);
    }

    for (pi, rings) in polygons.into_iter().enumerate() {
      if rings.is_empty() {
        return Err(GeometryError::EmptyPolygon { polygon: pi });
      }
      for (ri, ring) in rings.iter().enumerate() {
        if ring.len() < 4 {
          return Err(GeometryError::RingTooShort {
            polygon: pi,
            ring:    ri,
            len:     ring.len(),
          });
        }
        for pos in ring {
          check_position(pos)?;
        }
        if ring.first() != ring.last() {
          return Err(GeometryError::RingNotClosed { polygon: pi, ring: ri });
        }
      }
    }
    Ok(())
  }
}

fn check_position(pos: &[f64]) -> Result<(), GeometryError> {
  if !(2..=3).contains(&pos.len()) {
    return Err(GeometryError::BadPosition(pos.len()));
  }
  if pos.iter().any(|v| !v.is_finite()) {
    return Err(GeometryError::NonFinite);
  }
  let (lon, lat) = (pos[0], pos[1]);
  if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
    return Err(GeometryError::OutOfBounds { lon, lat });
  }
  Ok(())
}
