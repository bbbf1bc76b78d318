//! Durable analysis log — append-only CSV with a header row.
//!
//! Column order is fixed by `AnalysisRecord`'s field order:
//! timestamp, subject, query, summary, deep_dive, sources.
//!
//! Appends never read or rewrite existing rows, so prior records survive
//! a crash mid-append. A corrupt existing file surfaces as a read error
//! instead of being silently treated as empty.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::VaultError;
use crate::models::AnalysisRecord;

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file with a header row when it
    /// does not exist yet (or is empty).
    pub fn append(&self, record: &AnalysisRecord) -> Result<(), VaultError> {
        let needs_header = self
            .path
            .metadata()
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        tracing::debug!(path = %self.path.display(), "Appended analysis record");
        Ok(())
    }

    /// Read the whole log back, in insertion order.
    ///
    /// A missing file is an empty log; a malformed file is an error for
    /// the caller to surface, not a reason to discard data.
    pub fn load(&self) -> Result<Vec<AnalysisRecord>, VaultError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }

    /// The most recent `n` records, oldest first.
    pub fn tail(&self, n: usize) -> Result<Vec<AnalysisRecord>, VaultError> {
        let mut records = self.load()?;
        let skip = records.len().saturating_sub(n);
        Ok(records.split_off(skip))
    }
}
