//! Outcome recorder
//!
//! Concurrent cascades finish in any order; each records its outcome with
//! the company's position in the configured list, and readers always see
//! outcomes in company order.

use crate::output::stats::RunSummary;
use crate::state::Outcome;
use std::sync::Mutex;

/// Append-only, thread-safe collection of terminal outcomes
#[derive(Debug, Default)]
pub struct OutcomeRecorder {
    entries: Mutex<Vec<(usize, Outcome)>>,
}

impl OutcomeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the outcome for the company at `position`
    pub fn record(&self, position: usize, outcome: Outcome) {
        tracing::debug!(
            "Recording {} outcome for {} (#{})",
            outcome.status(),
            outcome.company(),
            position + 1
        );
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push((position, outcome));
    }

    /// Outcomes with their positions, in company order
    pub fn entries(&self) -> Vec<(usize, Outcome)> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        entries.sort_by_key(|(position, _)| *position);
        entries
    }

    /// Outcomes in company order
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.entries().into_iter().map(|(_, outcome)| outcome).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_outcomes(&self.outcomes())
    }
}
