//! Backup system for the contact book
//!
//! The safety net around every write to the primary contacts file.
//!
//! # Architecture
//!
//! - `BackupManager`: one `daily-backup` snapshot per calendar day, with
//!   retention and restore by date
//! - `UndoManager`: a single `undo` snapshot taken before each write
//!
//! Both store plain byte copies of the primary file in the snapshot
//! directory. See [`snapshot`] for the naming scheme.
//!
//! # Retention Policy
//!
//! By default the newest 30 daily backups are kept. Undo snapshots are not
//! subject to retention since at most one exists.

mod manager;
pub mod snapshot;
mod undo;

pub use manager::BackupManager;
pub use snapshot::{SnapshotInfo, SnapshotKind};
pub use undo::UndoManager;
