//! Bulk boundary import from a GeoJSON `FeatureCollection`.
//!
//! Each feature's `properties` carry the record fields; its `geometry`
//! becomes the boundary. The whole file is validated before anything is
//! written, and the batch is inserted in one transaction.

use std::path::Path;

use anyhow::{Context, Result, bail};
use bunge_core::{constituency::NewConstituency, geometry::Geometry};
use bunge_store_sqlite::SqliteStore;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ImportCollection {
  #[serde(rename = "type")]
  pub kind:     String,
  pub features: Vec<ImportFeature>,
}

#[derive(Debug, Deserialize)]
pub struct ImportFeature {
  pub properties: NewConstituency,
  #[serde(default)]
  pub geometry:   Option<Geometry>,
}

impl ImportCollection {
  pub fn from_path(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
  }

  /// Turn features into validated store inputs, naming the first bad feature.
  pub fn into_records(self) -> Result<Vec<NewConstituency>> {
    if self.kind != "FeatureCollection" {
      bail!("expected a FeatureCollection, found {:?}", self.kind);
    }

    self
      .features
      .into_iter()
      .enumerate()
      .map(|(index, feature)| -> Result<NewConstituency> {
        let mut record = feature.properties;
        record.geom = feature.geometry;
        record
          .validate()
          .with_context(|| format!("feature {index} ({:?})", record.name))?;
        Ok(record)
      })
      .collect()
  }
}

/// Validate and insert every feature. Returns the number of records written.
pub async fn import(store: &SqliteStore, collection: ImportCollection) -> Result<usize> {
  let records = collection.into_records()?;
  let inserted = store
    .insert_batch(records)
    .await
    .context("inserting constituencies")?;
  tracing::info!(count = inserted.len(), "import complete");
  Ok(inserted.len())
}
