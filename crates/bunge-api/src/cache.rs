//! Time-bounded cache of serialised responses, keyed on request path.
//!
//! The projected dataset changes rarely, so a stale window of a few minutes
//! is acceptable. A zero TTL disables caching entirely.

use std::{collections::HashMap, time::Duration};

use bytes::Bytes;
use tokio::{sync::RwLock, time::Instant};

use crate::etag::compute_etag;

/// Default time a cached projection stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A serialised body plus its validator.
#[derive(Debug, Clone)]
pub struct CachedResponse {
  pub body:      Bytes,
  pub etag:      String,
  pub stored_at: Instant,
}

impl CachedResponse {
  pub fn new(body: Bytes) -> Self {
    let etag = compute_etag(&body);
    Self { body, etag, stored_at: Instant::now() }
  }
}

#[derive(Debug)]
pub struct ResponseCache {
  ttl:     Duration,
  entries: RwLock<HashMap<String, CachedResponse>>,
}

impl ResponseCache {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl, entries: RwLock::new(HashMap::new()) }
  }

  pub fn ttl(&self) -> Duration { self.ttl }

  pub fn is_enabled(&self) -> bool { !self.ttl.is_zero() }

  /// Return the fresh entry for `key`, if any.
  pub async fn get(&self, key: &str) -> Option<CachedResponse> {
    self.get_at(key, Instant::now()).await
  }

  pub(crate) async fn get_at(&self, key: &str, now: Instant) -> Option<CachedResponse> {
    if !self.is_enabled() {
      return None;
    }
    let entries = self.entries.read().await;
    entries
      .get(key)
      .filter(|entry| now.saturating_duration_since(entry.stored_at) < self.ttl)
      .cloned()
  }

  /// Store `body` under `key` and return the entry that will be served.
  ///
  /// With caching disabled the entry is built but not retained.
  pub async fn insert(&self, key: String, body: Bytes) -> CachedResponse {
    let entry = CachedResponse::new(body);
    if self.is_enabled() {
      let mut entries = self.entries.write().await;
      entries.retain(|_, e| e.stored_at.elapsed() < self.ttl);
      entries.insert(key, entry.clone());
    }
    entry
  }
}
