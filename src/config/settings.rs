//! User settings for the contact book
//!
//! Backup retention and duplicate-merge preferences, persisted as JSON.

use serde::{Deserialize, Serialize};

use super::paths::ContactPaths;
use crate::error::ContactError;
use crate::services::merge::MergePolicy;
use crate::storage::file_io::write_json_atomic;

/// Backup retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Number of daily backups to keep
    pub daily_count: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self { daily_count: 30 }
    }
}

/// Duplicate detection and merge preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Minimum name similarity (0.0 - 1.0) for a candidate pair
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Conflict policy used when `merge` is run without `--policy`
    #[serde(default)]
    pub default_policy: MergePolicy,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            default_policy: MergePolicy::default(),
        }
    }
}

/// User settings for the contact book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version of the settings file
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Backup retention policy
    #[serde(default)]
    pub backup_retention: BackupRetention,

    /// Duplicate merge preferences
    #[serde(default)]
    pub merge: MergeSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_similarity_threshold() -> f64 {
    0.85
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backup_retention: BackupRetention::default(),
            merge: MergeSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &ContactPaths) -> Result<Self, ContactError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| ContactError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| ContactError::Config(format!("Failed to parse settings file: {}", e)))?;

        if !(0.0..=1.0).contains(&settings.merge.similarity_threshold) {
            return Err(ContactError::Config(format!(
                "similarity_threshold must be between 0 and 1, got {}",
                settings.merge.similarity_threshold
            )));
        }

        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ContactPaths) -> Result<(), ContactError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.backup_retention.daily_count, 30);
        assert_eq!(settings.merge.similarity_threshold, 0.85);
        assert_eq!(settings.merge.default_policy, MergePolicy::KeepA);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ContactPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.backup_retention.daily_count = 7;
        settings.merge.default_policy = MergePolicy::Prompt;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.backup_retention.daily_count, 7);
        assert_eq!(loaded.merge.default_policy, MergePolicy::Prompt);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ContactPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"backup_retention":{"daily_count":3}}"#)
            .unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.backup_retention.daily_count, 3);
        assert_eq!(loaded.merge.similarity_threshold, 0.85);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ContactPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"merge":{"similarity_threshold":1.5}}"#)
            .unwrap();

        assert!(matches!(
            Settings::load_or_create(&paths),
            Err(ContactError::Config(_))
        ));
    }
}
