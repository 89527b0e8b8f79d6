//! SQLite Tracking Recorder
//!
//! Implements TrackingRecorder against an existing `logintracking` table.

use crate::domain::entities::LoginTracking;
use crate::domain::ports::{TrackingError, TrackingRecorder};
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;

/// Insert statement. Column names and order are an external contract.
pub const INSERT_LOGIN_TRACKING: &str = "
INSERT INTO logintracking (
    userid, email, datelocalacces, ip, platform,
    macaddress, browser, countrycode, gmttime, lang, action, jsonstring
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

/// Reference schema of the external table. The recorder never creates it.
pub const LOGIN_TRACKING_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS logintracking (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    userid TEXT NOT NULL,
    email TEXT NOT NULL DEFAULT '',
    datelocalacces TEXT NOT NULL,
    ip TEXT NOT NULL DEFAULT '',
    platform TEXT NOT NULL,
    macaddress TEXT NOT NULL DEFAULT '',
    browser TEXT NOT NULL,
    countrycode TEXT NOT NULL,
    gmttime TEXT NOT NULL DEFAULT '',
    lang TEXT NOT NULL DEFAULT '',
    action TEXT NOT NULL,
    jsonstring TEXT NOT NULL DEFAULT ''
);
"#;

/// SQLite-backed tracking recorder.
///
/// One connection behind a mutex; statements run on the blocking pool.
pub struct SqliteTrackingRecorder {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTrackingRecorder {
    /// Open the database file holding the `logintracking` table.
    pub fn open(db_path: &str) -> Result<Self, TrackingError> {
        let conn = Connection::open(db_path).map_err(|e| TrackingError::Unavailable(Box::new(e)))?;
        tracing::info!("tracking DB opened at {}", db_path);
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already opened connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn insert_blocking(conn: &Connection, record: &LoginTracking) -> rusqlite::Result<usize> {
        conn.execute(
            INSERT_LOGIN_TRACKING,
            params![
                record.user_id,
                record.email,
                record.date_local_access,
                record.ip,
                record.platform,
                record.mac_address,
                record.browser,
                record.country_code,
                record.gmt_time,
                record.lang,
                record.action,
                record.json_string,
            ],
        )
    }
}

#[async_trait]
impl TrackingRecorder for SqliteTrackingRecorder {
    async fn insert(&self, record: &LoginTracking) -> Result<(), TrackingError> {
        let conn = self.conn.clone();
        let row = record.clone();

        let result = tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            Self::insert_blocking(&guard, &row)
        })
        .await;

        match result {
            Ok(Ok(_)) => {
                tracing::info!(
                    "tracking inserted user={} action={}",
                    record.user_id,
                    record.action
                );
                Ok(())
            }
            Ok(Err(e)) => Err(TrackingError::PersistenceFailure(Box::new(e))),
            Err(e) => Err(TrackingError::PersistenceFailure(Box::new(e))),
        }
    }
}
