//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::Outcome;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Corrupt outcome row {id}: {message}")]
    CorruptRow { id: i64, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Runs are created when a scout starts and finished exactly once; outcomes
/// are appended in company order and never updated.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets the final status and finish timestamp of a run
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Outcomes =====

    /// Appends outcomes for a run, keyed by their position in the company list
    fn save_outcomes(&mut self, run_id: i64, outcomes: &[(usize, Outcome)]) -> StorageResult<()>;

    /// Loads the outcomes of a run in company order
    fn load_outcomes(&self, run_id: i64) -> StorageResult<Vec<Outcome>>;

    /// Counts outcomes of a run with the given status tag
    fn count_outcomes(&self, run_id: i64, status: &str) -> StorageResult<u64>;
}
