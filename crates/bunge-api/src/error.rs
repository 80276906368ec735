//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The store could not be reached. Not retried; the caller may try again.
  #[error("service unavailable: {0}")]
  ServiceUnavailable(#[source] bunge_core::Error),

  /// Stored data could not be projected. The whole response fails rather
  /// than omitting the offending record.
  #[error("data integrity error: {0}")]
  DataIntegrity(#[source] bunge_core::Error),

  #[error("not found")]
  NotFound,

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<bunge_core::Error> for ApiError {
  fn from(e: bunge_core::Error) -> Self {
    match e {
      bunge_core::Error::Unavailable(_) => ApiError::ServiceUnavailable(e),
      e if e.is_data_integrity() => ApiError::DataIntegrity(e),
      other => ApiError::Internal(other.to_string()),
    }
  }
}

impl From<serde_json::Error> for ApiError {
  fn from(e: serde_json::Error) -> Self { ApiError::Internal(e.to_string()) }
}

/// Convert any store backend error into an [`ApiError`].
pub fn store_error<E: Into<bunge_core::Error>>(e: E) -> ApiError {
  ApiError::from(e.into())
}

impl ApiError {
  /// Message safe to return to an anonymous client. The full chain is only
  /// logged.
  pub fn public_message(&self) -> String {
    match self {
      ApiError::ServiceUnavailable(_) => "service unavailable".into(),
      ApiError::DataIntegrity(inner) => {
        let what = match inner {
          bunge_core::Error::InvalidGeometry { .. } => "invalid geometry".to_owned(),
          bunge_core::Error::InvalidElectionResults { .. } => "invalid election results".into(),
          bunge_core::Error::InvalidRegisteredVoters { .. } => {
            "invalid registered voter count".into()
          }
          bunge_core::Error::UnexpectedColumnType { column, .. } => format!("invalid {column}"),
          _ => "data integrity error".into(),
        };
        match inner.record_id() {
          Some(id) => format!("constituency {id}: {what}"),
          None => what,
        }
      }
      ApiError::NotFound => "not found".into(),
      ApiError::Internal(_) => "internal error".into(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::DataIntegrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
      ApiError::NotFound => StatusCode::NOT_FOUND,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
      tracing::error!(status = status.as_u16(), error = %self, "request failed");
    } else {
      tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
    }
    (status, Json(json!({ "error": self.public_message() }))).into_response()
  }
}
