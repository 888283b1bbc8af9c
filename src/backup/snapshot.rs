//! Snapshot files
//!
//! A snapshot is a byte copy of the primary contacts file. The file name
//! carries the creation time and the purpose:
//! `contacts_<YYYY-MM-DD>_<HHMMSS>_<daily-backup|undo>.csv`, in local time.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{ContactError, ContactResult};
use crate::storage::write_bytes_atomic;

const FILE_PREFIX: &str = "contacts_";
const FILE_SUFFIX: &str = ".csv";

/// Why a snapshot was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    /// First snapshot of a calendar day
    DailyBackup,
    /// Pre-write copy held for a single undo
    Undo,
}

impl SnapshotKind {
    /// Tag used in file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DailyBackup => "daily-backup",
            Self::Undo => "undo",
        }
    }

    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "daily-backup" => Some(Self::DailyBackup),
            "undo" => Some(Self::Undo),
            _ => None,
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata about a snapshot on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    /// Snapshot filename
    pub filename: String,
    /// Full path to the snapshot
    pub path: PathBuf,
    /// Local time the snapshot was taken
    pub created_at: NaiveDateTime,
    /// Purpose tag
    pub kind: SnapshotKind,
    /// Size in bytes
    pub size_bytes: u64,
}

impl SnapshotInfo {
    /// Calendar date of the snapshot
    pub fn date(&self) -> NaiveDate {
        self.created_at.date()
    }
}

/// Build the file name for a snapshot taken at `at`
pub fn snapshot_filename(kind: SnapshotKind, at: NaiveDateTime) -> String {
    format!(
        "{}{}_{}{}",
        FILE_PREFIX,
        at.format("%Y-%m-%d_%H%M%S"),
        kind.as_str(),
        FILE_SUFFIX
    )
}

/// Parse a snapshot file name back into its timestamp and kind
pub fn parse_snapshot_filename(filename: &str) -> Option<(NaiveDateTime, SnapshotKind)> {
    let stem = filename.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;

    let mut parts = stem.splitn(3, '_');
    let date_part = parts.next()?;
    let time_part = parts.next()?;
    let kind = SnapshotKind::parse(parts.next()?)?;

    if time_part.len() != 6 || !time_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    let hour: u32 = time_part[0..2].parse().ok()?;
    let minute: u32 = time_part[2..4].parse().ok()?;
    let second: u32 = time_part[4..6].parse().ok()?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;

    Some((NaiveDateTime::new(date, time), kind))
}

/// Read snapshot metadata for `path`, or `None` if it isn't a snapshot
pub fn snapshot_info(path: &Path) -> Option<SnapshotInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();
    let (created_at, kind) = parse_snapshot_filename(&filename)?;
    let size_bytes = fs::metadata(path).ok()?.len();

    Some(SnapshotInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        kind,
        size_bytes,
    })
}

/// List snapshots of one kind in `dir`, newest first. A missing directory
/// holds no snapshots.
pub fn list_snapshots(dir: &Path, kind: SnapshotKind) -> ContactResult<Vec<SnapshotInfo>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut snapshots = Vec::new();
    for entry in fs::read_dir(dir)
        .map_err(|e| ContactError::Io(format!("Failed to read snapshot directory: {}", e)))?
    {
        let entry = entry
            .map_err(|e| ContactError::Io(format!("Failed to read directory entry: {}", e)))?;

        if let Some(info) = snapshot_info(&entry.path()) {
            if info.kind == kind {
                snapshots.push(info);
            }
        }
    }

    snapshots.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.filename.cmp(&a.filename))
    });
    Ok(snapshots)
}

/// Atomically write a snapshot of `bytes` into `dir`
pub fn write_snapshot(
    dir: &Path,
    kind: SnapshotKind,
    at: NaiveDateTime,
    bytes: &[u8],
) -> ContactResult<SnapshotInfo> {
    let filename = snapshot_filename(kind, at);
    let path = dir.join(&filename);
    write_bytes_atomic(&path, bytes)?;

    Ok(SnapshotInfo {
        filename,
        path,
        created_at: at.with_nanosecond(0).unwrap_or(at),
        kind,
        size_bytes: bytes.len() as u64,
    })
}
