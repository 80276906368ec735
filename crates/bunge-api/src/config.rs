//! Runtime server configuration.

use std::{path::PathBuf, time::Duration};

use bunge_core::map::MapDefaults;
use serde::Deserialize;

/// Server configuration, deserialised from `config.toml` and `BUNGE_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// Seconds a projected response stays cached; `0` disables the cache.
  pub cache_ttl_secs: u64,
  pub map:            MapDefaults,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:           "127.0.0.1".to_string(),
      port:           8000,
      store_path:     PathBuf::from("db.sqlite3"),
      cache_ttl_secs: crate::cache::DEFAULT_TTL.as_secs(),
      map:            MapDefaults::default(),
    }
  }
}

impl ServerConfig {
  pub fn cache_ttl(&self) -> Duration { Duration::from_secs(self.cache_ttl_secs) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
