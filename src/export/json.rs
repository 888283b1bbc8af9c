//! JSON export
//!
//! Writes contacts as a pretty-printed JSON array. Each object carries
//! `id`, `name`, `phone`, `email`, `tags` (array) and `favorite`; missing
//! phone or email is `null`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{ContactError, ContactResult};
use crate::models::Contact;

/// Default export file name, relative to the working directory
pub const DEFAULT_JSON_FILE: &str = "contacts.json";

/// Write `contacts` as a JSON array to `writer`
pub fn export_json<W: Write>(contacts: &[&Contact], writer: W) -> ContactResult<()> {
    let mut writer = writer;
    serde_json::to_writer_pretty(&mut writer, contacts)
        .map_err(|e| ContactError::Export(format!("Failed to write JSON: {}", e)))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write `contacts` as a JSON array to a file at `path`
pub fn export_json_file(contacts: &[&Contact], path: &Path) -> ContactResult<()> {
    let file = File::create(path).map_err(|e| {
        ContactError::Export(format!("Failed to create {}: {}", path.display(), e))
    })?;
    export_json(contacts, BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewContact;
    use crate::services::import;
    use tempfile::TempDir;

    #[test]
    fn test_export_shape() {
        let ann = NewContact::named("Ann Lee")
            .with_email("ann@example.com")
            .with_tags("work,friend")
            .favorite(true)
            .into_contact()
            .unwrap();

        let mut buf = Vec::new();
        export_json(&[&ann], &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        let item = &value[0];
        assert_eq!(item["id"], ann.id.to_full_string());
        assert_eq!(item["name"], "Ann Lee");
        assert!(item["phone"].is_null());
        assert_eq!(item["tags"], serde_json::json!(["friend", "work"]));
        assert_eq!(item["favorite"], true);
    }

    #[test]
    fn test_export_empty() {
        let mut buf = Vec::new();
        export_json(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().trim(), "[]");
    }

    #[test]
    fn test_exported_file_imports_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.json");
        let ann = NewContact::named("Ann Lee")
            .with_phone("555-0100")
            .into_contact()
            .unwrap();

        export_json_file(&[&ann], &path).unwrap();
        let rows = import::parse_json(File::open(&path).unwrap()).unwrap();

        let imported = rows[0].as_ref().unwrap();
        assert_eq!(imported.name, ann.name);
        assert_eq!(imported.phone, ann.phone);
        assert_ne!(imported.id, ann.id);
    }
}
