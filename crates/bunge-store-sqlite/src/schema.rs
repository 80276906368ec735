//! SQL schema for the Bunge SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Name of the constituency table.
pub const TABLE: &str = "constituencies";

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS constituencies (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,  -- never reused
    name              TEXT NOT NULL,
    mp                TEXT NOT NULL,
    party             TEXT NOT NULL,
    impeachment_vote  TEXT NOT NULL,
    budget_vote       TEXT NOT NULL,
    county            TEXT NOT NULL,
    registered_voters INTEGER CHECK (registered_voters IS NULL OR registered_voters >= 0),
    updated_name      TEXT,
    election_results  TEXT NOT NULL DEFAULT '{}',   -- JSON object: name -> percentage
    geom              TEXT                          -- GeoJSON (current) or WKT/EWKT (legacy), EPSG:4326
);

CREATE INDEX IF NOT EXISTS constituencies_name_idx ON constituencies(name, id);

PRAGMA user_version = 1;
";
