//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Report-Scout database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track scout runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- One terminal outcome per company per run
CREATE TABLE IF NOT EXISTS outcomes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    position INTEGER NOT NULL,
    company TEXT NOT NULL,
    status TEXT NOT NULL,
    report_type TEXT,
    url TEXT,
    complete_text TEXT,
    page_count INTEGER,
    reason TEXT,
    recorded_at TEXT NOT NULL,
    UNIQUE(run_id, position)
);

CREATE INDEX IF NOT EXISTS idx_outcomes_run ON outcomes(run_id);
CREATE INDEX IF NOT EXISTS idx_outcomes_company ON outcomes(company);
CREATE INDEX IF NOT EXISTS idx_outcomes_status ON outcomes(status);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
