//! Append-only provenance ledger.
//!
//! One JSON object per line. Lines are never rewritten or deleted; an
//! exclusive file lock guards each append so concurrent kernels on the same
//! workspace interleave whole lines.

use crate::core::trace::TraceEntry;
use crate::storage::ledger_path;
use fs2::FileExt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Errors that can occur in the trace ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Result of scanning the ledger file.
#[derive(Debug, Default)]
pub struct LedgerScan {
    pub entries: Vec<TraceEntry>,
    /// Count of non-blank lines that failed to parse.
    pub malformed_lines: usize,
}

/// Append-only writer and reader for the trace file.
#[derive(Debug, Clone)]
pub struct TraceLedger {
    path: PathBuf,
}

impl TraceLedger {
    /// Creates a ledger for the given workspace root.
    #[must_use]
    pub fn open(workspace: &Path) -> Self {
        Self {
            path: ledger_path(workspace),
        }
    }

    /// Returns the ledger file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry as a single JSON line, creating the containing
    /// directory if missing.
    pub fn append(&self, entry: &TraceEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(entry)?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;
        let result = writeln!(file, "{json}").and_then(|()| file.flush());
        let _ = file.unlock();

        result.map_err(LedgerError::from)
    }

    /// Scans the whole ledger, tolerating malformed lines. A missing file is
    /// an empty scan.
    pub fn scan(&self) -> Result<LedgerScan> {
        if !self.path.exists() {
            return Ok(LedgerScan::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut scan = LedgerScan::default();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TraceEntry>(line) {
                Ok(entry) => scan.entries.push(entry),
                Err(_) => scan.malformed_lines += 1,
            }
        }
        Ok(scan)
    }

    /// Reads all well-formed entries in append order.
    pub fn read_all(&self) -> Result<Vec<TraceEntry>> {
        Ok(self.scan()?.entries)
    }
}
