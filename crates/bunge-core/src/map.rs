//! Static map display defaults for boundary editing and viewing tools.
//!
//! Replaces per-request widget customisation with one configuration object
//! that clients read once. Every field can be overridden from server config.

use serde::{Deserialize, Serialize};

use crate::geometry::WGS84_SRID;

/// A raster tile source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
  pub name:        String,
  /// URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders.
  pub url:         String,
  pub attribution: String,
}

/// How boundaries are drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStyle {
  pub color:        String,
  pub weight:       u32,
  pub fill_color:   String,
  pub fill_opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleUnits {
  Metric,
  Imperial,
  Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapDefaults {
  /// `[lat, lon]` of the initial view.
  pub center:             [f64; 2],
  pub zoom:               u8,
  pub min_zoom:           u8,
  pub max_zoom:           u8,
  pub scale:              ScaleUnits,
  pub attribution_prefix: String,
  pub srid:               i64,
  pub tiles:              Vec<TileLayer>,
  pub style:              FeatureStyle,
}

impl Default for MapDefaults {
  fn default() -> Self {
    Self {
      center:             [0.5, 37.0],
      zoom:               7,
      min_zoom:           7,
      max_zoom:           18,
      scale:              ScaleUnits::Both,
      attribution_prefix: "Constituency Boundaries".into(),
      srid:               WGS84_SRID,
      tiles:              vec![TileLayer {
        name:        "OpenStreetMap".into(),
        url:         "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
        attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".into(),
      }],
      style:              FeatureStyle {
        color:        "#FF5722".into(),
        weight:       3,
        fill_color:   "#FF9800".into(),
        fill_opacity: 0.3,
      },
    }
  }
}

impl MapDefaults {
  /// `true` when the zoom levels are ordered `min <= zoom <= max`.
  pub fn zoom_is_consistent(&self) -> bool {
    self.min_zoom <= self.zoom && self.zoom <= self.max_zoom
  }
}
