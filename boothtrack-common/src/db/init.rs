//! Database initialization
//!
//! Opens (or creates) the SQLite database, applies pragmas, and creates the
//! schema idempotently. The pool lifecycle is explicit: opened at process
//! start, closed at shutdown, never a module-level global.

use std::path::Path;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

use crate::Result;

/// Initialize the database connection pool and create tables if needed
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

    configure_connection(&pool).await?;
    create_sessions_table(&pool).await?;

    Ok(pool)
}

/// In-memory database with the same schema, for tests and demos.
///
/// Limited to a single connection: each in-memory SQLite connection is its
/// own database.
pub async fn init_database_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    create_sessions_table(&pool).await?;
    Ok(pool)
}

async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers while an ingestion write is in flight
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            booth_id INTEGER NOT NULL,
            device_id TEXT NOT NULL,
            rssi_values TEXT NOT NULL,
            user_retention INTEGER NOT NULL,
            in_time TEXT NOT NULL,
            out_time TEXT NOT NULL,
            average_distance REAL NOT NULL,
            timestamp TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn creates_database_file_and_parent_directory() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("boothtrack.db");

        let pool = init_database(&db_path).await.unwrap();
        assert!(db_path.exists());

        // Schema is usable immediately
        sqlx::query("SELECT COUNT(*) FROM sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        pool.close().await;
    }

    #[tokio::test]
    async fn reopening_existing_database_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("boothtrack.db");

        let pool = init_database(&db_path).await.unwrap();
        pool.close().await;

        let pool = init_database(&db_path).await.unwrap();
        sqlx::query("SELECT COUNT(*) FROM sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        pool.close().await;
    }
}
