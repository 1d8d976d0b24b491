//! Append-only audit log
//!
//! Every meaningful cascade transition is written as one timestamped line,
//! `[YYYY-mm-dd HH:MM:SS] message`, and mirrored to tracing at info level.
//! The file is opened in append mode so successive runs accumulate.

use crate::output::stats::RunSummary;
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Timestamp format of each audit line
pub const AUDIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Width of the separator line written before each company
const SEPARATOR_WIDTH: usize = 50;

/// Thread-safe, line-oriented audit log
#[derive(Debug)]
pub struct AuditLog {
    path: Option<PathBuf>,
    file: Option<Mutex<File>>,
}

impl AuditLog {
    /// Opens (or creates) the audit log for appending
    ///
    /// The parent directory is created if it does not exist.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            file: Some(Mutex::new(file)),
        })
    }

    /// An audit log that only mirrors to tracing
    pub fn disabled() -> Self {
        Self {
            path: None,
            file: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes one line
    ///
    /// Write failures are reported through tracing and otherwise ignored; the
    /// audit trail never aborts a cascade.
    pub fn log(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!("{}", message);

        let Some(file) = &self.file else {
            return;
        };

        let line = format!("[{}] {}\n", Local::now().format(AUDIT_TIMESTAMP_FORMAT), message);
        let mut file = file.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = file.write_all(line.as_bytes()) {
            tracing::warn!("Failed to write audit log: {}", e);
        }
    }

    /// Writes the separator that opens a company's section
    pub fn log_separator(&self) {
        self.log("=".repeat(SEPARATOR_WIDTH));
    }

    /// Writes the end-of-run summary block
    pub fn log_summary(&self, summary: &RunSummary) {
        for line in summary.log_lines() {
            self.log(line);
        }
    }
}
