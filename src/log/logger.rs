//! Error logger for the append-only error log
//!
//! Every write opens the file in append mode and flushes immediately.
//! Logging is best effort: a failure to write is swallowed so it can never
//! take down the command that was reporting an error.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::error::{ContactError, ContactResult};

use super::entry::ErrorEntry;

/// Handles writing error entries to the error log file
#[derive(Debug, Clone)]
pub struct ErrorLog {
    /// Path to the error log file
    log_path: PathBuf,
}

impl ErrorLog {
    /// Create an ErrorLog that writes to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append one entry for a caught error. Never fails.
    pub fn record(&self, operation: &str, error: &dyn fmt::Display) {
        let _ = self.append(&ErrorEntry::now(operation, error));
    }

    /// Append an entry, reporting write failures to the caller
    pub fn append(&self, entry: &ErrorEntry) -> ContactResult<()> {
        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| ContactError::Io(format!("Failed to open error log: {}", e)))?;

        writeln!(file, "{}", entry)
            .map_err(|e| ContactError::Io(format!("Failed to write error log: {}", e)))?;

        file.flush()
            .map_err(|e| ContactError::Io(format!("Failed to flush error log: {}", e)))
    }

    /// Read all entries in chronological order. Lines that don't parse are
    /// skipped.
    pub fn read_all(&self) -> ContactResult<Vec<ErrorEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.log_path)
            .map_err(|e| ContactError::Io(format!("Failed to read error log: {}", e)))?;

        Ok(contents.lines().filter_map(ErrorEntry::parse).collect())
    }

    /// Get the path to the error log file
    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}
