//! Read-only GeoJSON API for the Bunge constituency store.
//!
//! Exposes an axum [`Router`] backed by any
//! [`bunge_core::store::ConstituencyStore`]. The only mutation path is
//! offline tooling; this crate never writes.

pub mod cache;
pub mod config;
pub mod constituencies;
pub mod error;
pub mod etag;
pub mod geojson;

use std::sync::Arc;

use axum::{Router, routing::get};
use bunge_core::{map::MapDefaults, store::ConstituencyStore};
use tower_http::trace::TraceLayer;

pub use cache::ResponseCache;
pub use config::ServerConfig;
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ConstituencyStore> {
  pub store: Arc<S>,
  pub cache: Arc<ResponseCache>,
  pub map:   Arc<MapDefaults>,
}

impl<S: ConstituencyStore> AppState<S> {
  pub fn new(store: S, config: &ServerConfig) -> Self {
    Self {
      store: Arc::new(store),
      cache: Arc::new(ResponseCache::new(config.cache_ttl())),
      map:   Arc::new(config.map.clone()),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router. Unknown paths yield a JSON 404 and unsupported
/// methods on known paths yield 405.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ConstituencyStore + Clone + 'static,
{
  Router::new()
    .route("/constituencies/",              get(constituencies::collection::<S>))
    .route("/constituencies/map-defaults/", get(constituencies::map_defaults::<S>))
    .fallback(|| async { ApiError::NotFound })
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use bunge_core::{
    constituency::{ConstituencyRecord, NewConstituency},
    geometry::{Geometry, GeometryError},
  };
  use bunge_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;

  use super::*;

  fn config(cache_ttl_secs: u64) -> ServerConfig {
    ServerConfig { cache_ttl_secs, ..ServerConfig::default() }
  }

  async fn make_state(cache_ttl_secs: u64) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState::new(store, &config(cache_ttl_secs))
  }

  fn constituency(name: &str) -> NewConstituency {
    NewConstituency {
      name:             name.into(),
      mp:               "John Doe".into(),
      party:            "X".into(),
      impeachment_vote: "Yes".into(),
      budget_vote:      "No".into(),
      county:           "Makueni".into(),
      ..Default::default()
    }
  }

  fn boundary() -> Geometry {
    Geometry::MultiPolygon(vec![vec![vec![
      vec![37.52, -2.03],
      vec![37.61, -2.03],
      vec![37.61, -1.91],
      vec![37.57, -1.88],
      vec![37.52, -1.91],
      vec![37.52, -2.03],
    ]]])
  }

  async fn request<S>(
    state: AppState<S>,
    method: &str,
    uri: &str,
    headers: Vec<(header::HeaderName, &str)>,
  ) -> axum::response::Response
  where
    S: ConstituencyStore + Clone + 'static,
  {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::empty()).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn body_bytes(resp: axum::response::Response) -> bytes::Bytes {
    axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap()
  }

  async fn get_json<S>(state: AppState<S>) -> Value
  where
    S: ConstituencyStore + Clone + 'static,
  {
    let resp = request(state, "GET", "/constituencies/", vec![]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
  }

  // ── Collection ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn empty_store_returns_empty_collection() {
    let state = make_state(300).await;
    let resp = request(state, "GET", "/constituencies/", vec![]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert_eq!(ct, "application/json");
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], br#"{"type":"FeatureCollection","features":[]}"#);
  }

  #[tokio::test]
  async fn record_without_geometry_is_included_with_null() {
    let state = make_state(300).await;
    let kilome = state.store.insert(constituency("Kilome")).await.unwrap();

    let json = get_json(state).await;
    let features = json["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["type"], "Feature");
    assert_eq!(features[0]["id"], kilome.id);
    assert_eq!(features[0]["properties"]["name"], "Kilome");
    assert!(features[0]["geometry"].is_null());
  }

  #[tokio::test]
  async fn one_feature_per_record_sorted_by_name() {
    let state = make_state(300).await;
    let mut with_geom = constituency("Beta");
    with_geom.geom = Some(boundary());
    for input in [with_geom, constituency("alpha"), constituency("Alpha")] {
      state.store.insert(input).await.unwrap();
    }
    let count = bunge_core::store::ConstituencyStore::count(&*state.store).await.unwrap();

    let json = get_json(state).await;
    let features = json["features"].as_array().unwrap();
    assert_eq!(features.len() as u64, count);

    let names: Vec<&str> = features
      .iter()
      .map(|f| f["properties"]["name"].as_str().unwrap())
      .collect();
    assert_eq!(names, ["Alpha", "Beta", "alpha"]);

    for f in features {
      assert_eq!(f["id"], f["properties"]["id"]);
      let props = f["properties"].as_object().unwrap();
      assert!(!props.contains_key("geom"));
      assert!(!props.contains_key("geometry"));
    }
  }

  #[tokio::test]
  async fn geometry_round_trips_through_the_endpoint() {
    let state = make_state(300).await;
    let mut input = constituency("Kilome");
    input.geom = Some(boundary());
    input.registered_voters = Some(61_324);
    input.election_results.insert("UDA".into(), 54.2);
    state.store.insert(input).await.unwrap();

    let json = get_json(state).await;
    let feature = &json["features"][0];
    let text = feature["geometry"].to_string();
    let parsed = Geometry::from_geojson(&text).unwrap();
    assert_eq!(parsed, boundary());
    assert_eq!(parsed.vertex_count(), boundary().vertex_count());
    assert_eq!(feature["properties"]["registered_voters"], 61_324);
    assert_eq!(feature["properties"]["election_results"]["UDA"], 54.2);
  }

  #[tokio::test]
  async fn repeated_gets_are_byte_identical_without_cache() {
    let state = make_state(0).await;
    state.store.insert(constituency("Kilome")).await.unwrap();
    state.store.insert(constituency("Kaiti")).await.unwrap();

    let first = body_bytes(request(state.clone(), "GET", "/constituencies/", vec![]).await).await;
    let second = body_bytes(request(state, "GET", "/constituencies/", vec![]).await).await;
    assert_eq!(first, second);
  }

  // ── Caching ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn cached_response_survives_writes_within_ttl() {
    let state = make_state(300).await;
    state.store.insert(constituency("Kilome")).await.unwrap();
    let before = get_json(state.clone()).await;

    state.store.insert(constituency("Kaiti")).await.unwrap();
    let after = get_json(state).await;
    assert_eq!(before, after);
    assert_eq!(after["features"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn disabled_cache_reflects_writes_immediately() {
    let state = make_state(0).await;
    state.store.insert(constituency("Kilome")).await.unwrap();
    get_json(state.clone()).await;

    state.store.insert(constituency("Kaiti")).await.unwrap();
    let after = get_json(state.clone()).await;
    assert_eq!(after["features"].as_array().unwrap().len(), 2);

    let resp = request(state, "GET", "/constituencies/", vec![]).await;
    let cc = resp.headers().get(header::CACHE_CONTROL).unwrap().to_str().unwrap();
    assert_eq!(cc, "no-cache");
  }

  #[tokio::test]
  async fn matching_if_none_match_returns_304() {
    let state = make_state(300).await;
    state.store.insert(constituency("Kilome")).await.unwrap();

    let first = request(state.clone(), "GET", "/constituencies/", vec![]).await;
    let etag = first.headers().get(header::ETAG).unwrap().to_str().unwrap().to_string();
    let cc = first.headers().get(header::CACHE_CONTROL).unwrap().to_str().unwrap();
    assert_eq!(cc, "public, max-age=300");

    let second = request(
      state.clone(),
      "GET",
      "/constituencies/",
      vec![(header::IF_NONE_MATCH, etag.as_str())],
    )
    .await;
    assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    assert!(body_bytes(second).await.is_empty());

    let stale = request(
      state,
      "GET",
      "/constituencies/",
      vec![(header::IF_NONE_MATCH, "\"stale\"")],
    )
    .await;
    assert_eq!(stale.status(), StatusCode::OK);
  }

  // ── Methods and paths ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn write_methods_are_not_allowed() {
    for method in ["POST", "PUT", "PATCH", "DELETE"] {
      let state = make_state(300).await;
      let resp = request(state, method, "/constituencies/", vec![]).await;
      assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
    }
  }

  #[tokio::test]
  async fn head_is_served_without_body() {
    let state = make_state(300).await;
    let resp = request(state, "HEAD", "/constituencies/", vec![]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(header::ETAG));
    assert!(body_bytes(resp).await.is_empty());
  }

  #[tokio::test]
  async fn unknown_path_returns_404() {
    let state = make_state(300).await;
    let resp = request(state, "GET", "/parties/", vec![]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert_eq!(ct, "application/json");
    let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json["error"], "not found");
  }

  #[tokio::test]
  async fn map_defaults_are_served() {
    let state = make_state(300).await;
    let resp = request(state, "GET", "/constituencies/map-defaults/", vec![]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json["center"], serde_json::json!([0.5, 37.0]));
    assert_eq!(json["min_zoom"], 7);
    assert_eq!(json["style"]["fill_color"], "#FF9800");
  }

  // ── Failures ────────────────────────────────────────────────────────────────

  /// Store stand-in that always fails with a fixed error.
  #[derive(Clone)]
  struct FailingStore {
    integrity: bool,
  }

  impl ConstituencyStore for FailingStore {
    type Error = bunge_core::Error;

    async fn list_all(&self) -> Result<Vec<ConstituencyRecord>, Self::Error> {
      Err(self.error())
    }

    async fn count(&self) -> Result<u64, Self::Error> { Err(self.error()) }
  }

  impl FailingStore {
    fn error(&self) -> bunge_core::Error {
      if self.integrity {
        bunge_core::Error::InvalidGeometry { id: 9, source: GeometryError::Empty }
      } else {
        bunge_core::Error::Unavailable("database is locked".into())
      }
    }
  }

  #[tokio::test]
  async fn unreachable_store_returns_503() {
    let state = AppState::new(FailingStore { integrity: false }, &config(300));
    let resp = request(state, "GET", "/constituencies/", vec![]).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(json["error"].as_str().unwrap().contains("unavailable"));
  }

  #[tokio::test]
  async fn closed_sqlite_connection_returns_503() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = AppState::new(store.clone(), &config(300));
    store.close().await.unwrap();

    let resp = request(state, "GET", "/constituencies/", vec![]).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
  }

  #[tokio::test]
  async fn corrupt_geometry_returns_500() {
    let state = AppState::new(FailingStore { integrity: true }, &config(300));
    let resp = request(state, "GET", "/constituencies/", vec![]).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(json["error"].as_str().unwrap().contains("constituency 9"));
  }

  /// Store file seeded with one good row plus a row written by `corrupt_sql`.
  async fn corrupted_file_state(corrupt_sql: &str) -> (tempfile::TempDir, AppState<SqliteStore>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite3");
    let store = SqliteStore::open(&path).await.unwrap();
    store.insert(constituency("Kibwezi East")).await.unwrap();

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(corrupt_sql, []).unwrap();
    drop(conn);

    (dir, AppState::new(store, &config(300)))
  }

  #[tokio::test]
  async fn blob_geometry_in_store_returns_500() {
    let (_dir, state) = corrupted_file_state(
      "INSERT INTO constituencies
         (id, name, mp, party, impeachment_vote, budget_vote, county, geom)
       VALUES (40, 'Mbooni', 'MP', 'P', 'Yes', 'No', 'Makueni', x'0001E6100000')",
    )
    .await;

    let resp = request(state.clone(), "GET", "/constituencies/", vec![]).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json["error"], "constituency 40: invalid geometry");
    assert!(state.cache.get("/constituencies/").await.is_none());
  }

  #[tokio::test]
  async fn text_voter_count_in_store_returns_500() {
    let (_dir, state) = corrupted_file_state(
      "INSERT INTO constituencies
         (id, name, mp, party, impeachment_vote, budget_vote, county, registered_voters)
       VALUES (41, 'Kaiti', 'MP', 'P', 'Yes', 'No', 'Makueni', 'n/a')",
    )
    .await;

    let resp = request(state, "GET", "/constituencies/", vec![]).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json["error"], "constituency 41: invalid registered_voters");
  }

  #[tokio::test]
  async fn oversized_voter_count_in_store_returns_500() {
    let (_dir, state) = corrupted_file_state(
      "INSERT INTO constituencies
         (id, name, mp, party, impeachment_vote, budget_vote, county, registered_voters)
       VALUES (42, 'Makueni', 'MP', 'P', 'Yes', 'No', 'Makueni', 5000000000)",
    )
    .await;

    let resp = request(state, "GET", "/constituencies/", vec![]).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json["error"], "constituency 42: invalid registered voter count");
  }

  #[tokio::test]
  async fn failures_are_not_cached() {
    let state = AppState::new(FailingStore { integrity: false }, &config(300));
    request(state.clone(), "GET", "/constituencies/", vec![]).await;
    assert!(state.cache.get("/constituencies/").await.is_none());
  }
}
