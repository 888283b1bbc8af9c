//! Per-command session
//!
//! A `Session` is opened at the start of a command and dropped at its end.
//! It owns the loaded store, the settings and the safety-net managers, and
//! runs every mutation through the same pipeline:
//!
//! 1. take today's backup if there isn't one yet
//! 2. apply the change to a staged copy of the store
//! 3. capture an undo point from the primary file on disk
//! 4. atomically save the staged store
//!
//! A change that fails in step 2, or leaves the contacts as they were, does
//! not touch the primary file or the undo slot. A save that fails in step 4
//! hands the undo slot back as it was.

use chrono::NaiveDate;

use crate::backup::{BackupManager, SnapshotInfo, UndoManager};
use crate::config::{ContactPaths, Settings};
use crate::error::{ContactError, ContactResult};
use crate::log::ErrorLog;
use crate::storage::ContactStore;

/// Explicit context for one command run
#[derive(Debug)]
pub struct Session {
    paths: ContactPaths,
    settings: Settings,
    store: ContactStore,
    backups: BackupManager,
    undo: UndoManager,
    errors: ErrorLog,
    /// Why the primary file could not be read, for sessions opened with
    /// [`Session::open_for_recovery`]
    primary_error: Option<ContactError>,
}

impl Session {
    /// Open the data directory: create it if needed, load settings and the
    /// primary file, and write an empty primary file if none exists
    pub fn open(paths: ContactPaths) -> ContactResult<Self> {
        Self::open_with(paths, false)
    }

    /// Open the data directory for a command that repairs the primary file.
    ///
    /// A corrupt primary file does not fail the open: the store starts
    /// empty, mutations are refused, no daily backup is copied from it, and
    /// the error is kept in [`primary_error`](Self::primary_error).
    pub fn open_for_recovery(paths: ContactPaths) -> ContactResult<Self> {
        Self::open_with(paths, true)
    }

    fn open_with(paths: ContactPaths, tolerate_corrupt: bool) -> ContactResult<Self> {
        paths.ensure_directories()?;
        let settings = Settings::load_or_create(&paths)?;

        let (store, primary_error) = match ContactStore::load(paths.contacts_file()) {
            Ok(store) => (store, None),
            Err(err @ ContactError::CorruptData { .. }) if tolerate_corrupt => {
                (ContactStore::new(paths.contacts_file()), Some(err))
            }
            Err(err) => return Err(err),
        };
        if primary_error.is_none() {
            store.ensure_exists()?;
        }

        let backups = BackupManager::new(&paths, settings.backup_retention.clone());
        let undo = UndoManager::new(paths.snapshot_dir(), paths.contacts_file());
        let errors = ErrorLog::new(paths.error_log());

        Ok(Self {
            paths,
            settings,
            store,
            backups,
            undo,
            errors,
            primary_error,
        })
    }

    /// The error that kept the primary file from loading, if any
    pub fn primary_error(&self) -> Option<&ContactError> {
        self.primary_error.as_ref()
    }

    pub fn paths(&self) -> &ContactPaths {
        &self.paths
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The loaded contacts
    pub fn store(&self) -> &ContactStore {
        &self.store
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    pub fn undo_manager(&self) -> &UndoManager {
        &self.undo
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// Append a caught error to the error log
    pub fn record_error(&self, operation: &str, error: &dyn std::fmt::Display) {
        self.errors.record(operation, error);
    }

    /// Run `change` against a staged copy of the store and persist it with
    /// the full safety net. `operation` names the command in the error log.
    pub fn mutate<T, F>(&mut self, operation: &str, change: F) -> ContactResult<T>
    where
        F: FnOnce(&mut ContactStore) -> ContactResult<T>,
    {
        if self.primary_error.is_some() {
            // Fails with the same CorruptData error a strict open reports
            self.reload()?;
        }
        self.daily_backup(operation);

        let mut staged = self.store.clone();
        let output = change(&mut staged)?;

        if staged.all() != self.store.all() {
            self.undo.capture_around(|| staged.save())?;
            self.store = staged;
        }

        Ok(output)
    }

    /// Take today's backup if none exists yet
    pub fn ensure_daily_backup(&self) -> ContactResult<Option<SnapshotInfo>> {
        self.backups.ensure_daily_backup()
    }

    /// Restore the primary file from the backup taken on `date`
    pub fn restore(&mut self, date: NaiveDate) -> ContactResult<SnapshotInfo> {
        self.backups.find_backup(date)?;
        self.daily_backup("restore");

        let info = self.backups.restore(date, &self.undo)?;
        self.reload()?;
        Ok(info)
    }

    /// Revert the last write. Does not create a new undo point.
    pub fn undo(&mut self) -> ContactResult<SnapshotInfo> {
        self.daily_backup("undo");

        let info = self.undo.undo()?;
        self.reload()?;
        Ok(info)
    }

    /// A failed daily backup is logged but doesn't block the write
    fn daily_backup(&self, operation: &str) {
        if self.primary_error.is_some() {
            return;
        }
        if let Err(e) = self.backups.ensure_daily_backup() {
            self.errors.record(&format!("{} (daily backup)", operation), &e);
        }
    }

    fn reload(&mut self) -> ContactResult<()> {
        self.store = ContactStore::load(self.paths.contacts_file())?;
        self.primary_error = None;
        Ok(())
    }
}
