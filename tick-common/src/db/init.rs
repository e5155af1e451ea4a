//! Database initialization
//!
//! Creates the database file on first run and brings the schema up to date.
//! Every statement is idempotent, so this runs unconditionally at startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Busy timeout applied to every pooled connection, in milliseconds
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Open (creating if needed) the sighting store and ensure its schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets readers proceed while ingestion or a submission is writing
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query(&format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS))
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory store
///
/// An in-memory SQLite database lives only as long as its connection, so the
/// pool is pinned to one connection that is never recycled.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create the sightings table and its lookup indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_sightings_table(pool).await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_sightings_location ON sightings (location COLLATE NOCASE)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sightings_observed_at ON sightings (observed_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_sightings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sightings (
            id TEXT PRIMARY KEY,
            observed_at TEXT NOT NULL,
            location TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'Unknown',
            category_detail TEXT NOT NULL DEFAULT '',
            lat REAL,
            lng REAL,
            attachment_ref TEXT,
            source_label TEXT NOT NULL DEFAULT 'System'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
