//! Backup manager for the contact book
//!
//! Takes at most one `daily-backup` snapshot per calendar day, prunes old
//! ones by the retention policy, and restores the primary file from the
//! backup of a given date.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::config::paths::ContactPaths;
use crate::config::settings::BackupRetention;
use crate::error::{ContactError, ContactResult, ValidationError};
use crate::storage::{decode_contacts, read_bytes_optional, write_bytes_atomic};

use super::snapshot::{list_snapshots, write_snapshot, SnapshotInfo, SnapshotKind};
use super::undo::UndoManager;

/// Manages daily backup creation, retention and restore
#[derive(Debug, Clone)]
pub struct BackupManager {
    /// Path to snapshot directory
    snapshot_dir: PathBuf,
    /// Primary contacts file
    primary: PathBuf,
    /// Retention policy
    retention: BackupRetention,
}

impl BackupManager {
    /// Create a new BackupManager
    pub fn new(paths: &ContactPaths, retention: BackupRetention) -> Self {
        Self {
            snapshot_dir: paths.snapshot_dir(),
            primary: paths.contacts_file(),
            retention,
        }
    }

    /// Take today's backup if there isn't one yet
    pub fn ensure_daily_backup(&self) -> ContactResult<Option<SnapshotInfo>> {
        self.ensure_daily_backup_at(Local::now().naive_local())
    }

    /// Take a backup dated `now` unless one exists for that date. Returns
    /// `None` when nothing was written, including when there is no primary
    /// file to copy.
    pub fn ensure_daily_backup_at(&self, now: NaiveDateTime) -> ContactResult<Option<SnapshotInfo>> {
        if self.backup_dates()?.contains(&now.date()) {
            return Ok(None);
        }

        let bytes = match read_bytes_optional(&self.primary)? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };

        let info = write_snapshot(&self.snapshot_dir, SnapshotKind::DailyBackup, now, &bytes)?;
        self.enforce_retention()?;
        Ok(Some(info))
    }

    /// List all daily backups, newest first
    pub fn list_backups(&self) -> ContactResult<Vec<SnapshotInfo>> {
        list_snapshots(&self.snapshot_dir, SnapshotKind::DailyBackup)
    }

    /// Dates that have a daily backup
    pub fn backup_dates(&self) -> ContactResult<BTreeSet<NaiveDate>> {
        Ok(self.list_backups()?.iter().map(SnapshotInfo::date).collect())
    }

    /// Find the backup taken on `date`
    pub fn find_backup(&self, date: NaiveDate) -> ContactResult<SnapshotInfo> {
        self.list_backups()?
            .into_iter()
            .find(|b| b.date() == date)
            .ok_or_else(|| ContactError::backup_not_found(date.format("%Y-%m-%d").to_string()))
    }

    /// Turn user input into a backup date. Accepts `YYYY-MM-DD`, `YYYYMMDD`
    /// or `latest`.
    pub fn resolve_date(&self, input: &str) -> ContactResult<NaiveDate> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("latest") {
            return self
                .list_backups()?
                .first()
                .map(SnapshotInfo::date)
                .ok_or_else(|| ContactError::backup_not_found("latest"));
        }

        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(input, "%Y%m%d"))
            .map_err(|_| {
                ValidationError::Invalid(format!(
                    "'{}' is not a date, expected YYYY-MM-DD",
                    input
                ))
                .into()
            })
    }

    /// Replace the primary file with the backup taken on `date`.
    ///
    /// The primary file is left alone unless the backup exists and parses.
    /// An undo point is captured before the overwrite.
    pub fn restore(&self, date: NaiveDate, undo: &UndoManager) -> ContactResult<SnapshotInfo> {
        let info = self.find_backup(date)?;

        let bytes = fs::read(&info.path)
            .map_err(|e| ContactError::Io(format!("Failed to read backup: {}", e)))?;
        decode_contacts(&bytes, &info.path)?;

        undo.capture_around(|| write_bytes_atomic(&self.primary, &bytes))?;
        Ok(info)
    }

    /// Enforce retention policy by deleting the oldest daily backups
    pub fn enforce_retention(&self) -> ContactResult<Vec<PathBuf>> {
        let keep = self.retention.daily_count.max(1) as usize;
        let mut deleted = Vec::new();

        for backup in self.list_backups()?.into_iter().skip(keep) {
            fs::remove_file(&backup.path)
                .map_err(|e| ContactError::Io(format!("Failed to delete old backup: {}", e)))?;
            deleted.push(backup.path);
        }

        Ok(deleted)
    }
}
