//! SQLite-based outcome sink
//!
//! This module provides a sink that records outcomes directly to the
//! SQLite storage backend under the current run.

use crate::output::traits::{OutcomeSink, OutputError, OutputResult};
use crate::state::Outcome;
use crate::storage::{SqliteStorage, Storage};
use std::sync::{Arc, Mutex};

/// SQLite-based outcome sink
pub struct SqliteOutcomeSink {
    storage: Arc<Mutex<SqliteStorage>>,
    run_id: i64,
}

impl SqliteOutcomeSink {
    /// Creates a new SQLite outcome sink
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `run_id` - The current run ID
    pub fn new(storage: Arc<Mutex<SqliteStorage>>, run_id: i64) -> Self {
        Self { storage, run_id }
    }
}

impl OutcomeSink for SqliteOutcomeSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn persist(&self, outcomes: &[(usize, Outcome)]) -> OutputResult<()> {
        let mut storage = self
            .storage
            .lock()
            .map_err(|e| OutputError::Storage(format!("Failed to lock storage: {}", e)))?;

        storage
            .save_outcomes(self.run_id, outcomes)
            .map_err(|e| OutputError::Storage(e.to_string()))
    }
}
