//! Error type for `bunge-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] bunge_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl From<Error> for bunge_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      Error::Database(db) => bunge_core::Error::Unavailable(Box::new(db)),
      Error::Json(json) => bunge_core::Error::Serialization(json),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
