//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ContactError;

/// Temp file used while replacing `path`: same directory, `.tmp` appended
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("data"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write bytes to a file atomically (write to temp, then rename)
///
/// The file is either completely written or not modified at all. A crash
/// before the rename leaves only a stray temp file behind.
pub fn write_bytes_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), ContactError> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                ContactError::Io(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    // Create temp file in same directory (important for atomic rename)
    let temp_path = temp_path_for(path);

    let result = write_and_sync(&temp_path, bytes).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| {
            ContactError::Io(format!("Failed to replace {}: {}", path.display(), e))
        })
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn write_and_sync(temp_path: &Path, bytes: &[u8]) -> Result<(), ContactError> {
    let file = File::create(temp_path)
        .map_err(|e| ContactError::Io(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .map_err(|e| ContactError::Io(format!("Failed to write data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| ContactError::Io(format!("Failed to flush data: {}", e)))?;

    // Sync to disk before rename
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| ContactError::Io(format!("Failed to sync data: {}", e)))
}

/// Write pretty JSON to a file atomically
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), ContactError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let json = serde_json::to_vec_pretty(data)
        .map_err(|e| ContactError::Json(format!("Failed to serialize data: {}", e)))?;
    write_bytes_atomic(path, &json)
}

/// Read a whole file, returning `None` if it doesn't exist
pub fn read_bytes_optional<P: AsRef<Path>>(path: P) -> Result<Option<Vec<u8>>, ContactError> {
    let path = path.as_ref();
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ContactError::Io(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_temp_path_keeps_directory() {
        let path = Path::new("/data/contacts.csv");
        assert_eq!(temp_path_for(path), Path::new("/data/contacts.csv.tmp"));
    }

    #[test]
    fn test_write_and_read_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.csv");

        write_bytes_atomic(&path, b"id,name\n").unwrap();
        assert_eq!(read_bytes_optional(&path).unwrap().unwrap(), b"id,name\n");
    }

    #[test]
    fn test_read_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_bytes_optional(temp_dir.path().join("missing.csv"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");
        let temp_path = temp_dir.path().join("test.json.tmp");

        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        write_json_atomic(&path, &data).unwrap();

        assert!(path.exists());
        assert!(!temp_path.exists());
        let loaded: TestData = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_failed_rename_keeps_original() {
        let temp_dir = TempDir::new().unwrap();
        // A directory at the target path makes the rename fail
        let path = temp_dir.path().join("occupied");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep.txt"), b"x").unwrap();

        assert!(write_bytes_atomic(&path, b"new").is_err());
        assert!(path.join("keep.txt").exists());
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("test.csv");

        write_bytes_atomic(&path, b"x").unwrap();
        assert!(path.exists());
    }
}
