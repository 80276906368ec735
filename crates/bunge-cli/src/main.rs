//! `bunge` — offline operator tool for a Bunge store file.
//!
//! Not part of the served API. Two jobs:
//!
//! ```text
//! bunge report --db db.sqlite3 --sample 5
//! bunge import --db db.sqlite3 boundaries.geojson
//! ```

mod import;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use bunge_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bunge", about = "Inspect and load a Bunge constituency store")]
struct Args {
  /// Path to the SQLite store file.
  #[arg(long, default_value = "db.sqlite3", global = true)]
  db: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print tables, row counts, sample rows, and the parties in use.
  Report {
    /// Number of sample rows to print.
    #[arg(long, default_value_t = 5)]
    sample: usize,
  },
  /// Load constituencies from a GeoJSON FeatureCollection.
  Import {
    /// GeoJSON file whose feature properties hold the record fields.
    file: PathBuf,

    /// Validate the file without writing anything.
    #[arg(long)]
    dry_run: bool,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  match args.command {
    Command::Report { sample } => {
      let conn = report::open_existing(&args.db)?;
      let report = report::Report::gather(&conn, sample)?;
      print!("{report}");
    }
    Command::Import { file, dry_run } => {
      let collection = import::ImportCollection::from_path(&file)?;
      if dry_run {
        let records = collection.into_records()?;
        println!("{} features valid; nothing written", records.len());
      } else {
        let store = SqliteStore::open(&args.db)
          .await
          .with_context(|| format!("opening store at {}", args.db.display()))?;
        let count = import::import(&store, collection).await?;
        println!("imported {count} constituencies into {}", args.db.display());
      }
    }
  }

  Ok(())
}
