//! [`SqliteStore`] — the SQLite implementation of [`ConstituencyStore`].

use std::path::Path;

use bunge_core::{
  constituency::{ConstituencyRecord, NewConstituency},
  store::ConstituencyStore,
};

use crate::{
  Result,
  encode::{COLUMNS, EncodedConstituency, RawConstituency, encode_new},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A constituency store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Close the underlying connection. Every clone of this store fails with a
  /// database error afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  /// Validate and persist one record, returning it with its assigned `id`.
  pub async fn insert(&self, input: NewConstituency) -> Result<ConstituencyRecord> {
    let mut records = self.insert_batch(vec![input]).await?;
    Ok(records.remove(0))
  }

  /// Validate and persist `inputs` in a single transaction.
  ///
  /// Every input is validated before anything is written; one invalid input
  /// aborts the whole batch.
  pub async fn insert_batch(
    &self,
    inputs: Vec<NewConstituency>,
  ) -> Result<Vec<ConstituencyRecord>> {
    for input in &inputs {
      input.validate()?;
    }

    let rows: Vec<EncodedConstituency> =
      inputs.iter().map(encode_new).collect::<Result<_>>()?;

    let ids: Vec<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(rows.len());
        {
          let mut stmt = tx.prepare(
            "INSERT INTO constituencies (
               name, mp, party, impeachment_vote, budget_vote, county,
               registered_voters, updated_name, election_results, geom
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          )?;
          for row in &rows {
            let id = stmt.insert(rusqlite::params![
              row.name,
              row.mp,
              row.party,
              row.impeachment_vote,
              row.budget_vote,
              row.county,
              row.registered_voters,
              row.updated_name,
              row.election_results,
              row.geom,
            ])?;
            ids.push(id);
          }
        }
        tx.commit()?;
        Ok(ids)
      })
      .await?;

    tracing::debug!(count = ids.len(), "inserted constituencies");

    Ok(
      inputs
        .into_iter()
        .zip(ids)
        .map(|(input, id)| ConstituencyRecord {
          id,
          name: input.name,
          mp: input.mp,
          party: input.party,
          impeachment_vote: input.impeachment_vote,
          budget_vote: input.budget_vote,
          county: input.county,
          registered_voters: input.registered_voters,
          updated_name: input.updated_name,
          election_results: input.election_results,
          geom: input.geom,
        })
        .collect(),
    )
  }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }
}

// ─── ConstituencyStore impl ──────────────────────────────────────────────────

impl ConstituencyStore for SqliteStore {
  type Error = crate::Error;

  async fn list_all(&self) -> Result<Vec<ConstituencyRecord>> {
    let raws: Vec<RawConstituency> = self
      .conn
      .call(|conn| {
        // BINARY collation gives ordinal, case-sensitive ordering.
        let mut stmt = conn.prepare(&format!(
          "SELECT {COLUMNS} FROM constituencies ORDER BY name COLLATE BINARY ASC, id ASC"
        ))?;
        let rows = stmt
          .query_map([], RawConstituency::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawConstituency::into_record).collect()
  }

  async fn count(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM constituencies", [], |r| r.get(0))?)
      })
      .await?;
    Ok(n.max(0) as u64)
  }
}
