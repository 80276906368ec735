//! Handlers for `/constituencies` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/constituencies/` | Full set as a GeoJSON `FeatureCollection`; cached |
//! | `GET`  | `/constituencies/map-defaults/` | Static map display defaults |

use axum::{
  Json,
  extract::{OriginalUri, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use bunge_core::{map::MapDefaults, store::ConstituencyStore};
use bytes::Bytes;

use crate::{
  AppState,
  cache::CachedResponse,
  error::{ApiError, store_error},
  etag::if_none_match,
  geojson::FeatureCollection,
};

const CONTENT_TYPE_JSON: &str = "application/json";

// ─── Collection ──────────────────────────────────────────────────────────────

/// `GET /constituencies/`
pub async fn collection<S>(
  State(state): State<AppState<S>>,
  OriginalUri(uri): OriginalUri,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: ConstituencyStore + Clone + 'static,
{
  let key = uri.path().to_owned();

  let entry = match state.cache.get(&key).await {
    Some(hit) => {
      tracing::debug!(path = %key, "serving cached projection");
      hit
    }
    None => {
      tracing::debug!(path = %key, "cache miss; projecting store");
      let body = project(&*state.store).await?;
      state.cache.insert(key, body).await
    }
  };

  Ok(respond(&entry, &headers, state.cache.ttl().as_secs()))
}

/// Read the whole store and serialise it as a `FeatureCollection`.
pub async fn project<S: ConstituencyStore>(store: &S) -> Result<Bytes, ApiError> {
  let records = store.list_all().await.map_err(store_error)?;
  let collection = FeatureCollection::from_records(records);
  tracing::info!(features = collection.features.len(), "projected constituencies");
  Ok(Bytes::from(serde_json::to_vec(&collection)?))
}

fn respond(entry: &CachedResponse, headers: &HeaderMap, max_age: u64) -> Response {
  let cache_control = if max_age == 0 {
    "no-cache".to_string()
  } else {
    format!("public, max-age={max_age}")
  };

  let not_modified = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| if_none_match(v, &entry.etag));

  if not_modified {
    return (
      StatusCode::NOT_MODIFIED,
      [
        (header::ETAG, entry.etag.clone()),
        (header::CACHE_CONTROL, cache_control),
      ],
    )
      .into_response();
  }

  (
    StatusCode::OK,
    [
      (header::CONTENT_TYPE, CONTENT_TYPE_JSON.to_string()),
      (header::ETAG, entry.etag.clone()),
      (header::CACHE_CONTROL, cache_control),
    ],
    entry.body.clone(),
  )
    .into_response()
}

// ─── Map defaults ────────────────────────────────────────────────────────────

/// `GET /constituencies/map-defaults/`
pub async fn map_defaults<S>(State(state): State<AppState<S>>) -> Json<MapDefaults>
where
  S: ConstituencyStore + Clone + 'static,
{
  Json(state.map.as_ref().clone())
}
