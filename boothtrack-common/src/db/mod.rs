//! Session persistence
//!
//! The store is a narrow adapter over one append-only table: a single
//! atomic insert per session and an unordered read of everything. Nothing
//! here mutates or deletes; retention policy is a database administration
//! concern.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::scan::{NewSession, Session};

mod init;
pub use init::{init_database, init_database_in_memory};

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    booth_id: i64,
    device_id: String,
    rssi_values: String,
    user_retention: i64,
    in_time: String,
    out_time: String,
    average_distance: f64,
    timestamp: String,
}

impl SessionRow {
    fn into_session(self) -> Result<Session> {
        let rssi_values: Vec<i64> = serde_json::from_str(&self.rssi_values)?;
        Ok(Session {
            id: self.id,
            booth_id: self.booth_id,
            device_id: self.device_id,
            rssi_values,
            user_retention: self.user_retention,
            in_time: self.in_time,
            out_time: self.out_time,
            average_distance: self.average_distance,
            timestamp: self.timestamp,
        })
    }
}

/// Narrow persistence adapter over the sessions table.
///
/// Constructed once in `main` with an explicit pool and injected into the
/// handlers; there is no ambient global handle.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Durably insert one session; returns the store-assigned id.
    ///
    /// The insert is a single statement, so readers never observe a partial
    /// record.
    pub async fn insert(&self, session: &NewSession) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let rssi_json = serde_json::to_string(&session.rssi_values)?;

        sqlx::query(
            "INSERT INTO sessions \
             (id, booth_id, device_id, rssi_values, user_retention, \
              in_time, out_time, average_distance, timestamp) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(session.booth_id)
        .bind(&session.device_id)
        .bind(&rssi_json)
        .bind(session.user_retention)
        .bind(&session.in_time)
        .bind(&session.out_time)
        .bind(session.average_distance)
        .bind(&session.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Every stored session, ids rendered as strings. Ordering unspecified.
    pub async fn list_all(&self) -> Result<Vec<Session>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT id, booth_id, device_id, rssi_values, user_retention, \
             in_time, out_time, average_distance, timestamp FROM sessions",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SessionRow::into_session).collect()
    }

    /// Close the underlying pool (process shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
