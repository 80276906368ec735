//! Error types for `bunge-core`.

use thiserror::Error;

use crate::geometry::GeometryError;

/// Failure classes shared by every store backend.
///
/// Backends convert their own error types into this one so the API layer can
/// map failures to responses without knowing which backend produced them.
#[derive(Debug, Error)]
pub enum Error {
  /// The backing store could not be reached or queried.
  #[error("store unavailable: {0}")]
  Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("constituency {id}: invalid geometry: {source}")]
  InvalidGeometry {
    id:     i64,
    #[source]
    source: GeometryError,
  },

  #[error("constituency {id}: invalid election results: {reason}")]
  InvalidElectionResults { id: i64, reason: String },

  #[error("constituency {id}: invalid registered voter count {value}")]
  InvalidRegisteredVoters { id: i64, value: i64 },

  /// A column held a value of a storage class its decoder cannot accept.
  #[error("constituency {id}: column {column} holds {found}")]
  UnexpectedColumnType {
    id:     i64,
    column: &'static str,
    found:  &'static str,
  },

  /// A record submitted on the write path failed field validation.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// `true` when the failure comes from stored data rather than from the
  /// store being unreachable.
  pub fn is_data_integrity(&self) -> bool {
    matches!(
      self,
      Self::InvalidGeometry { .. }
        | Self::InvalidElectionResults { .. }
        | Self::InvalidRegisteredVoters { .. }
        | Self::UnexpectedColumnType { .. }
    )
  }

  /// Id of the stored record a data-integrity failure points at.
  pub fn record_id(&self) -> Option<i64> {
    match self {
      Self::InvalidGeometry { id, .. }
      | Self::InvalidElectionResults { id, .. }
      | Self::InvalidRegisteredVoters { id, .. }
      | Self::UnexpectedColumnType { id, .. } => Some(*id),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
