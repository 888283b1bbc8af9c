//! Path management for the contact book
//!
//! ## Path Resolution Order
//!
//! 1. `--data-dir` flag or `CONTACT_BOOK_DIR` environment variable
//! 2. The platform data directory from `directories`
//!    (`~/.local/share/contact-book` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::ContactError;

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "CONTACT_BOOK_DIR";

/// Manages all paths used by the contact book
#[derive(Debug, Clone)]
pub struct ContactPaths {
    /// Base directory for all contact book data
    base_dir: PathBuf,
}

impl ContactPaths {
    /// Resolve paths from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, ContactError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create paths rooted at a custom base directory
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// The primary data file
    pub fn contacts_file(&self) -> PathBuf {
        self.base_dir.join("contacts.csv")
    }

    /// Directory holding daily-backup and undo snapshots
    pub fn snapshot_dir(&self) -> PathBuf {
        self.base_dir.join("snapshots")
    }

    /// Append-only error log
    pub fn error_log(&self) -> PathBuf {
        self.base_dir.join("error.log")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure the base and snapshot directories exist
    pub fn ensure_directories(&self) -> Result<(), ContactError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| ContactError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.snapshot_dir()).map_err(|e| {
            ContactError::Io(format!("Failed to create snapshot directory: {}", e))
        })?;

        Ok(())
    }
}

/// Resolve the default data directory path based on platform
fn resolve_default_path() -> Result<PathBuf, ContactError> {
    ProjectDirs::from("", "", "contact-book")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ContactError::Config("Could not determine a home directory".into()))
}
