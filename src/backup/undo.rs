//! Single-level undo
//!
//! Before each write to the primary file the current on-disk bytes are kept
//! as an `undo` snapshot. Only one undo point exists at a time: capturing a
//! new one discards the previous one, and undoing consumes it. A write that
//! fails after its undo point was taken gives the previous point back.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::error::{ContactError, ContactResult};
use crate::storage::{decode_contacts, encode_contacts, read_bytes_optional, write_bytes_atomic};

use super::snapshot::{list_snapshots, write_snapshot, SnapshotInfo, SnapshotKind};

/// Holds at most one pre-write snapshot of the primary file
#[derive(Debug, Clone)]
pub struct UndoManager {
    snapshot_dir: PathBuf,
    primary: PathBuf,
}

impl UndoManager {
    /// Create an undo manager for `primary`, keeping its snapshot in
    /// `snapshot_dir`
    pub fn new(snapshot_dir: PathBuf, primary: PathBuf) -> Self {
        Self {
            snapshot_dir,
            primary,
        }
    }

    /// Copy the current primary file into the undo slot
    pub fn capture(&self) -> ContactResult<SnapshotInfo> {
        self.capture_at(Local::now().naive_local())
    }

    /// Copy the current primary file into the undo slot, stamped `at`.
    /// A missing primary file is captured as an empty contact file.
    pub fn capture_at(&self, at: NaiveDateTime) -> ContactResult<SnapshotInfo> {
        let bytes = match read_bytes_optional(&self.primary)? {
            Some(bytes) => bytes,
            None => encode_contacts(&[])?,
        };

        let info = write_snapshot(&self.snapshot_dir, SnapshotKind::Undo, at, &bytes)?;
        self.clear_except(Some(&info.path))?;
        Ok(info)
    }

    /// Capture an undo point, then run `write`. When `write` fails the new
    /// undo point is dropped and the one held before is put back.
    pub fn capture_around<T, F>(&self, write: F) -> ContactResult<T>
    where
        F: FnOnce() -> ContactResult<T>,
    {
        self.capture_around_at(Local::now().naive_local(), write)
    }

    /// [`capture_around`](Self::capture_around) with the snapshot stamped `at`
    pub fn capture_around_at<T, F>(&self, at: NaiveDateTime, write: F) -> ContactResult<T>
    where
        F: FnOnce() -> ContactResult<T>,
    {
        let previous = match self.pending()? {
            Some(info) => {
                let bytes = fs::read(&info.path).map_err(|e| {
                    ContactError::Io(format!("Failed to read undo snapshot: {}", e))
                })?;
                Some((info, bytes))
            }
            None => None,
        };

        let captured = self.capture_at(at)?;
        match write() {
            Ok(output) => Ok(output),
            Err(err) => {
                self.roll_back(&captured, previous)?;
                Err(err)
            }
        }
    }

    /// The held undo point, if any
    pub fn pending(&self) -> ContactResult<Option<SnapshotInfo>> {
        Ok(list_snapshots(&self.snapshot_dir, SnapshotKind::Undo)?
            .into_iter()
            .next())
    }

    /// Whether an undo point is held
    pub fn has_undo_point(&self) -> ContactResult<bool> {
        Ok(self.pending()?.is_some())
    }

    /// Put the held snapshot back as the primary file and empty the slot.
    /// No redo point is created.
    pub fn undo(&self) -> ContactResult<SnapshotInfo> {
        let info = self.pending()?.ok_or(ContactError::NothingToUndo)?;

        let bytes = fs::read(&info.path)
            .map_err(|e| ContactError::Io(format!("Failed to read undo snapshot: {}", e)))?;
        decode_contacts(&bytes, &info.path)?;

        write_bytes_atomic(&self.primary, &bytes)?;
        self.clear_except(None)?;
        Ok(info)
    }

    /// Remove `captured` and reinstate the slot as it was before
    fn roll_back(
        &self,
        captured: &SnapshotInfo,
        previous: Option<(SnapshotInfo, Vec<u8>)>,
    ) -> ContactResult<()> {
        match fs::remove_file(&captured.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ContactError::Io(format!(
                    "Failed to remove undo snapshot: {}",
                    e
                )))
            }
        }

        if let Some((info, bytes)) = previous {
            write_bytes_atomic(&info.path, &bytes)?;
        }
        Ok(())
    }

    /// Drop every undo snapshot other than `keep`
    fn clear_except(&self, keep: Option<&Path>) -> ContactResult<()> {
        for stale in list_snapshots(&self.snapshot_dir, SnapshotKind::Undo)? {
            if Some(stale.path.as_path()) == keep {
                continue;
            }
            fs::remove_file(&stale.path).map_err(|e| {
                ContactError::Io(format!("Failed to remove old undo snapshot: {}", e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewContact;
    use crate::storage::ContactStore;
    use tempfile::TempDir;

    fn setup() -> (UndoManager, ContactStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let primary = temp_dir.path().join("contacts.csv");
        let undo = UndoManager::new(temp_dir.path().join("snapshots"), primary.clone());
        let store = ContactStore::new(primary);
        (undo, store, temp_dir)
    }

    fn at(time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("2024-03-09 {}", time), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    #[test]
    fn test_undo_restores_identical_bytes() {
        let (undo, mut store, _temp) = setup();
        store.add(NewContact::named("Ann Lee")).unwrap();
        store.save().unwrap();
        let before = fs::read(store.path()).unwrap();

        undo.capture().unwrap();
        store.add(NewContact::named("Bob Stone")).unwrap();
        store.save().unwrap();
        assert_ne!(fs::read(store.path()).unwrap(), before);

        undo.undo().unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn test_second_undo_has_nothing() {
        let (undo, store, _temp) = setup();
        store.save().unwrap();

        undo.capture().unwrap();
        undo.undo().unwrap();

        assert!(matches!(undo.undo(), Err(ContactError::NothingToUndo)));
    }

    #[test]
    fn test_empty_slot() {
        let (undo, _store, _temp) = setup();
        assert!(!undo.has_undo_point().unwrap());
        assert!(matches!(undo.undo(), Err(ContactError::NothingToUndo)));
    }

    #[test]
    fn test_capture_keeps_single_slot() {
        let (undo, mut store, _temp) = setup();
        store.save().unwrap();
        undo.capture_at(at("10:00:00")).unwrap();

        store.add(NewContact::named("Ann Lee")).unwrap();
        store.save().unwrap();
        let latest = undo.capture_at(at("10:00:05")).unwrap();

        let held = list_snapshots(&undo.snapshot_dir, SnapshotKind::Undo).unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].path, latest.path);
    }

    #[test]
    fn test_capture_same_second_replaces() {
        let (undo, store, _temp) = setup();
        store.save().unwrap();

        let first = undo.capture_at(at("10:00:00")).unwrap();
        let second = undo.capture_at(at("10:00:00")).unwrap();

        assert_eq!(first.path, second.path);
        assert!(undo.has_undo_point().unwrap());
    }

    #[test]
    fn test_failed_write_keeps_previous_undo_point() {
        let (undo, mut store, _temp) = setup();
        store.save().unwrap();
        let empty = fs::read(store.path()).unwrap();

        undo.capture_around_at(at("10:00:00"), || {
            store.add(NewContact::named("Ann Lee"))?;
            store.save()
        })
        .unwrap();

        let err = undo
            .capture_around_at(at("10:00:05"), || -> ContactResult<()> {
                Err(ContactError::Io("disk full".into()))
            })
            .unwrap_err();
        assert!(matches!(err, ContactError::Io(_)));

        let held = list_snapshots(&undo.snapshot_dir, SnapshotKind::Undo).unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].created_at, at("10:00:00"));

        undo.undo().unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), empty);
    }

    #[test]
    fn test_failed_write_in_same_second_keeps_previous_bytes() {
        let (undo, mut store, _temp) = setup();
        store.save().unwrap();
        let empty = fs::read(store.path()).unwrap();
        undo.capture_at(at("10:00:00")).unwrap();

        store.add(NewContact::named("Ann Lee")).unwrap();
        store.save().unwrap();
        undo.capture_around_at(at("10:00:00"), || -> ContactResult<()> {
            Err(ContactError::Io("disk full".into()))
        })
        .unwrap_err();

        undo.undo().unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), empty);
    }

    #[test]
    fn test_capture_of_missing_primary_is_empty_file() {
        let (undo, store, _temp) = setup();
        undo.capture().unwrap();

        undo.undo().unwrap();
        let reloaded = ContactStore::load(store.path()).unwrap();
        assert!(reloaded.is_empty());
        assert!(store.path().exists());
    }

    #[test]
    fn test_corrupt_snapshot_is_not_restored() {
        let (undo, mut store, _temp) = setup();
        store.add(NewContact::named("Ann Lee")).unwrap();
        store.save().unwrap();
        let info = undo.capture().unwrap();
        fs::write(&info.path, "garbage,header\n").unwrap();
        let before = fs::read(store.path()).unwrap();

        assert!(matches!(undo.undo(), Err(ContactError::CorruptData { .. })));
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }
}
