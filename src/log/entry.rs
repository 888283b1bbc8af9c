//! Error log entry format
//!
//! One line per entry: `[YYYY-MM-DD HH:MM:SS] <operation>: <detail>`.

use chrono::{Local, NaiveDateTime};
use std::fmt;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single error log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    /// Local time the error was caught
    pub timestamp: NaiveDateTime,
    /// Command or step that failed
    pub operation: String,
    /// Error message, flattened to one line
    pub detail: String,
}

impl ErrorEntry {
    /// Create an entry stamped with the current local time
    pub fn now(operation: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            operation: operation.into(),
            detail: single_line(&detail.to_string()),
        }
    }

    /// Parse a line written by [`fmt::Display`]
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('[')?;
        let (stamp, rest) = rest.split_once("] ")?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
        let (operation, detail) = rest.split_once(": ")?;

        Some(Self {
            timestamp,
            operation: operation.to_string(),
            detail: detail.to_string(),
        })
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.operation,
            self.detail
        )
    }
}

fn single_line(text: &str) -> String {
    text.lines().map(str::trim).collect::<Vec<_>>().join(" ")
}
