//! JSON results file
//!
//! The results file is a pretty-printed array of outcome objects, one per
//! company, each tagged with a `status` field.

use crate::output::traits::{OutcomeSink, OutputResult};
use crate::state::Outcome;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes outcomes to a JSON file, replacing any previous contents
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutcomeSink for JsonFileSink {
    fn name(&self) -> &'static str {
        "json"
    }

    fn persist(&self, outcomes: &[(usize, Outcome)]) -> OutputResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let records: Vec<&Outcome> = outcomes.iter().map(|(_, outcome)| outcome).collect();

        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, &records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Reads a results file written by [`JsonFileSink`]
pub fn read_results_json(path: &Path) -> OutputResult<Vec<Outcome>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
