//! SQLite-backed run repository
//!
//! Each run is one row keyed by request id; the full [`RequestState`] is
//! stored as JSON next to the columns needed for listing.

use chrono::{DateTime, SecondsFormat, Utc};
use council_application::{RepositoryError, RunRepository};
use council_domain::{RequestState, RunSummary};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use tracing::info;

pub struct SqliteRunRepository {
    conn: Mutex<Connection>,
    path: PathBuf,
}

fn storage(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

impl SqliteRunRepository {
    /// Open (or create) the database, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(storage)?;
        }

        let conn = Connection::open(path).map_err(|e| {
            RepositoryError::Storage(format!("failed to open {}: {}", path.display(), e))
        })?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )
        .map_err(storage)?;
        Self::init_schema(&conn)?;

        info!("Run store opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn init_schema(conn: &Connection) -> Result<(), RepositoryError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS runs (
                request_id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                query      TEXT NOT NULL,
                state_json TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_runs_created_at ON runs(created_at);",
        )
        .map_err(storage)
    }
}

/// Fixed-width UTC timestamps sort lexicographically in time order.
fn encode_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl RunRepository for SqliteRunRepository {
    fn save(&self, state: &RequestState) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(state).map_err(storage)?;
        self.conn
            .lock()
            .execute(
                "INSERT INTO runs (request_id, created_at, query, state_json)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(request_id) DO UPDATE SET
                    created_at = excluded.created_at,
                    query      = excluded.query,
                    state_json = excluded.state_json",
                params![
                    state.request_id,
                    encode_time(&state.created_at),
                    state.query.content(),
                    json
                ],
            )
            .map_err(storage)?;
        Ok(())
    }

    fn load(&self, request_id: &str) -> Result<Option<RequestState>, RepositoryError> {
        let json: Option<String> = self
            .conn
            .lock()
            .query_row(
                "SELECT state_json FROM runs WHERE request_id = ?1",
                params![request_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage)?;

        json.map(|json| {
            serde_json::from_str(&json).map_err(|e| RepositoryError::Corrupt {
                request_id: request_id.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
    }

    fn list(&self, limit: usize) -> Result<Vec<RunSummary>, RepositoryError> {
        let rows: Vec<(String, String, String)> = {
            let conn = self.conn.lock();
            let mut stmt = conn
                .prepare(
                    "SELECT request_id, created_at, query FROM runs
                     ORDER BY created_at DESC LIMIT ?1",
                )
                .map_err(storage)?;
            let rows = stmt
                .query_map(params![limit as i64], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })
                .map_err(storage)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(storage)?;
            rows
        };

        rows.into_iter()
            .map(|(request_id, created_at, query)| {
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .map_err(|e| RepositoryError::Corrupt {
                        request_id: request_id.clone(),
                        reason: format!("bad created_at: {}", e),
                    })?
                    .with_timezone(&Utc);
                Ok(RunSummary {
                    request_id,
                    created_at,
                    query,
                })
            })
            .collect()
    }

    fn delete(&self, request_id: &str) -> Result<(), RepositoryError> {
        self.conn
            .lock()
            .execute("DELETE FROM runs WHERE request_id = ?1", params![request_id])
            .map_err(storage)?;
        Ok(())
    }
}
