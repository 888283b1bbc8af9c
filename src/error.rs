//! Custom error types for the contact book
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use std::path::Path;

use thiserror::Error;

/// A single field that failed validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty after trimming
    #[error("name cannot be empty")]
    EmptyName,

    /// Phone number failed the format check
    #[error("invalid phone number '{0}' (expected 7-15 digits, optional leading '+')")]
    InvalidPhone(String),

    /// Email address failed the format check
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// Regex search pattern could not be compiled
    #[error("invalid search pattern: {0}")]
    InvalidPattern(String),

    /// An identifier or argument that cannot be interpreted
    #[error("{0}")]
    Invalid(String),
}

/// The main error type for contact book operations
#[derive(Error, Debug)]
pub enum ContactError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors, including failed atomic replaces
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// CSV encoding errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Malformed primary or snapshot file
    #[error("Corrupt data in {file} (line {line}): {detail}")]
    CorruptData {
        file: String,
        line: u64,
        detail: String,
    },

    /// Validation errors for contact fields
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Undo requested with an empty undo slot
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl ContactError {
    /// Create a "not found" error for contacts
    pub fn contact_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Contact",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for backups
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Create a corrupt-data error for a file and 1-based line number
    pub fn corrupt(file: &Path, line: u64, detail: impl Into<String>) -> Self {
        Self::CorruptData {
            file: file.display().to_string(),
            line,
            detail: detail.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Process exit status for this error kind. 1 and 2 are left to
    /// setup failures and clap usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NotFound { .. } => 3,
            Self::Validation(_) => 4,
            Self::CorruptData { .. } => 5,
            Self::NothingToUndo => 6,
            Self::Io(_) => 7,
            Self::Config(_) => 8,
            Self::Json(_) => 9,
            Self::Csv(_) => 10,
            Self::Import(_) => 11,
            Self::Export(_) => 12,
        }
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for ContactError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ContactError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for ContactError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for contact book operations
pub type ContactResult<T> = Result<T, ContactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ContactError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = ContactError::contact_not_found("con-1234abcd");
        assert_eq!(err.to_string(), "Contact not found: con-1234abcd");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_wraps() {
        let err: ContactError = ValidationError::InvalidPhone("12".into()).into();
        assert!(err.is_validation());
        assert!(err.to_string().contains("invalid phone number '12'"));
    }

    #[test]
    fn test_corrupt_data_display() {
        let err = ContactError::corrupt(Path::new("contacts.csv"), 3, "bad id");
        assert_eq!(
            err.to_string(),
            "Corrupt data in contacts.csv (line 3): bad id"
        );
    }

    #[test]
    fn test_exit_codes_are_distinct_per_kind() {
        assert_ne!(
            ContactError::NothingToUndo.exit_code(),
            ContactError::backup_not_found("2025-01-01").exit_code()
        );
        assert_ne!(ContactError::Io("x".into()).exit_code(), 0);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ContactError = io_err.into();
        assert!(matches!(err, ContactError::Io(_)));
    }
}
