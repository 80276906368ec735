//! The `ConstituencyStore` trait.
//!
//! Implemented by storage backends (e.g. `bunge-store-sqlite`). The GeoJSON
//! API depends on this abstraction, not on a concrete backend. Only reads are
//! part of the trait; record creation is backend-specific tooling.

use std::future::Future;

use crate::constituency::ConstituencyRecord;

/// Read access to the constituency record set.
///
/// Backend errors convert into [`crate::Error`] so callers can tell an
/// unreachable store apart from bad stored data.
pub trait ConstituencyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Every record, ordered by `name` (ordinal, case-sensitive) then `id`.
  fn list_all(
    &self,
  ) -> impl Future<Output = Result<Vec<ConstituencyRecord>, Self::Error>> + Send + '_;

  /// Number of records in the store.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
