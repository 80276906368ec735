//! Strong ETags for projected response bodies.
//!
//! The ETag is a SHA-256 hash of the exact bytes served, so byte-identical
//! bodies always share an ETag.

use sha2::{Digest, Sha256};

/// Compute a quoted ETag for `body`.
pub fn compute_etag(body: &[u8]) -> String {
  let hash = Sha256::digest(body);
  format!("\"{}\"", hex::encode(hash))
}

/// `true` if an `If-None-Match` header value matches `etag`.
///
/// Accepts `*`, comma-separated lists, weak validators (`W/"..."`), and
/// bare tags sent without quotes.
pub fn if_none_match(header: &str, etag: &str) -> bool {
  let current = strip_etag(etag);
  header.split(',').map(str::trim).any(|candidate| {
    candidate == "*" || strip_etag(candidate) == current
  })
}

fn strip_etag(tag: &str) -> &str {
  tag
    .strip_prefix("W/")
    .unwrap_or(tag)
    .trim_matches('"')
}
