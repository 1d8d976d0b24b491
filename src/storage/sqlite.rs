//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::{Outcome, ReportType};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// The parent directory is created if it does not exist.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Failed),
    })
}

/// Raw outcome row, converted to an `Outcome` after the query finishes
struct OutcomeRow {
    id: i64,
    company: String,
    status: String,
    report_type: Option<String>,
    url: Option<String>,
    complete_text: Option<String>,
    page_count: Option<i64>,
    reason: Option<String>,
    recorded_at: String,
}

impl OutcomeRow {
    fn into_outcome(self) -> StorageResult<Outcome> {
        let id = self.id;
        let corrupt = move |message: String| StorageError::CorruptRow { id, message };

        let timestamp = DateTime::parse_from_rfc3339(&self.recorded_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| corrupt(format!("bad timestamp '{}': {}", self.recorded_at, e)))?;

        match self.status.as_str() {
            "success" => {
                let report_type = self
                    .report_type
                    .as_deref()
                    .and_then(ReportType::from_db_string)
                    .ok_or_else(|| corrupt("missing report type".to_string()))?;
                Ok(Outcome::Success {
                    company: self.company,
                    url: self.url.unwrap_or_default(),
                    text: self.complete_text.unwrap_or_default(),
                    page_count: self.page_count.unwrap_or(0).max(0) as usize,
                    report_type,
                    timestamp,
                })
            }
            "failed" => Ok(Outcome::Failure {
                company: self.company,
                reason: self.reason.unwrap_or_default(),
                timestamp,
            }),
            "cancelled" => Ok(Outcome::Cancelled {
                company: self.company,
                timestamp,
            }),
            other => Err(corrupt(format!("unknown status '{}'", other))),
        }
    }
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Outcomes =====

    fn save_outcomes(&mut self, run_id: i64, outcomes: &[(usize, Outcome)]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO outcomes
                 (run_id, position, company, status, report_type, url, complete_text, page_count, reason, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;

            for (position, outcome) in outcomes {
                let (report_type, url, text, page_count, reason) = match outcome {
                    Outcome::Success {
                        url,
                        text,
                        page_count,
                        report_type,
                        ..
                    } => (
                        Some(report_type.to_db_string()),
                        Some(url.as_str()),
                        Some(text.as_str()),
                        Some(*page_count as i64),
                        None,
                    ),
                    Outcome::Failure { reason, .. } => (None, None, None, None, Some(reason.as_str())),
                    Outcome::Cancelled { .. } => (None, None, None, None, None),
                };

                stmt.execute(params![
                    run_id,
                    *position as i64,
                    outcome.company(),
                    outcome.status(),
                    report_type,
                    url,
                    text,
                    page_count,
                    reason,
                    outcome.timestamp().to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_outcomes(&self, run_id: i64) -> StorageResult<Vec<Outcome>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, company, status, report_type, url, complete_text, page_count, reason, recorded_at
             FROM outcomes WHERE run_id = ?1 ORDER BY position",
        )?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok(OutcomeRow {
                    id: row.get(0)?,
                    company: row.get(1)?,
                    status: row.get(2)?,
                    report_type: row.get(3)?,
                    url: row.get(4)?,
                    complete_text: row.get(5)?,
                    page_count: row.get(6)?,
                    reason: row.get(7)?,
                    recorded_at: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(OutcomeRow::into_outcome).collect()
    }

    fn count_outcomes(&self, run_id: i64, status: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM outcomes WHERE run_id = ?1 AND status = ?2",
            params![run_id, status],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
