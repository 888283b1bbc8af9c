//! Bulk import service
//!
//! Reads contacts from an external CSV (columns found by header name) or a
//! JSON array. Every row is validated on its own: good rows are kept, bad
//! rows are reported with their position so the caller can log them.

use std::fmt;
use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;

use crate::error::{ContactError, ContactResult, ValidationError};
use crate::models::{parse_tags, Contact, NewContact, TagSet};
use crate::storage::contacts::parse_flag;
use crate::storage::ContactStore;

/// Column positions detected from a CSV header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub name: usize,
    pub phone: Option<usize>,
    pub email: Option<usize>,
    pub tags: Option<usize>,
    pub favorite: Option<usize>,
}

impl ColumnMapping {
    /// Detect columns from a header record. Header names are matched
    /// case-insensitively; unknown columns (including `id`) are ignored.
    pub fn detect(headers: &StringRecord) -> ContactResult<Self> {
        let find = |wanted: &[&str]| {
            headers
                .iter()
                .position(|h| wanted.contains(&h.trim().to_lowercase().as_str()))
        };

        let name = find(&["name", "full name", "full_name"]).ok_or_else(|| {
            ContactError::Import("CSV header has no 'name' column".to_string())
        })?;

        Ok(Self {
            name,
            phone: find(&["phone", "telephone", "mobile"]),
            email: find(&["email", "e-mail", "mail"]),
            tags: find(&["tags", "tag", "categories"]),
            favorite: find(&["favorite", "favourite", "fav"]),
        })
    }
}

/// Why one import row was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// The row parsed but a field failed validation
    Invalid(ValidationError),
    /// The row could not be read at all
    Malformed(String),
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(e) => write!(f, "Validation error: {}", e),
            Self::Malformed(detail) => write!(f, "Malformed row: {}", detail),
        }
    }
}

impl From<ValidationError> for RowError {
    fn from(e: ValidationError) -> Self {
        Self::Invalid(e)
    }
}

/// A rejected row and where it was
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// Line in the CSV file, or 1-based element index in a JSON array
    pub position: u64,
    pub error: RowError,
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.position, self.error)
    }
}

/// Per-row outcome of parsing an import source
pub type RowResult = Result<Contact, RowFailure>;

/// Result of a completed import
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Contacts added to the store
    pub imported: Vec<Contact>,
    /// Rows that were skipped
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    /// Number of rows looked at
    pub fn total(&self) -> usize {
        self.imported.len() + self.failures.len()
    }
}

/// Parse a CSV with a header row. Fails only when the header itself is
/// unusable; every data row yields its own result.
pub fn parse_csv<R: Read>(reader: R) -> ContactResult<Vec<RowResult>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ContactError::Import(format!("Could not read CSV header: {}", e)))?
        .clone();
    let mapping = ColumnMapping::detect(&headers)?;

    let mut results = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Header is line 1, so data rows start at line 2
        let fallback_line = idx as u64 + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let position = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                results.push(Err(RowFailure {
                    position,
                    error: RowError::Malformed(e.to_string()),
                }));
                continue;
            }
        };

        let position = record
            .position()
            .map(|p| p.line())
            .unwrap_or(fallback_line);
        results.push(
            parse_record(&record, &mapping).map_err(|error| RowFailure { position, error }),
        );
    }

    Ok(results)
}

fn parse_record(record: &StringRecord, mapping: &ColumnMapping) -> Result<Contact, RowError> {
    let column = |idx: Option<usize>| {
        idx.and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let favorite = match column(mapping.favorite) {
        Some(flag) => parse_flag(flag).ok_or_else(|| {
            ValidationError::Invalid(format!("bad favorite flag '{}'", flag))
        })?,
        None => false,
    };

    let new = NewContact {
        name: column(Some(mapping.name)).unwrap_or("").to_string(),
        phone: column(mapping.phone).map(str::to_string),
        email: column(mapping.email).map(str::to_string),
        tags: column(mapping.tags).map(parse_tags).unwrap_or_default(),
        favorite,
    };

    Ok(new.into_contact()?)
}

/// Tags in JSON may be an array or a comma-separated string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonTags {
    List(Vec<String>),
    Text(String),
}

impl JsonTags {
    fn into_tag_set(self) -> TagSet {
        match self {
            Self::List(items) => parse_tags(&items.join(",")),
            Self::Text(text) => parse_tags(&text),
        }
    }
}

/// One element of a JSON import array
#[derive(Debug, Deserialize)]
struct JsonContact {
    #[serde(default)]
    name: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    tags: Option<JsonTags>,
    #[serde(default)]
    favorite: bool,
}

/// Parse a JSON array of contact objects. Ids in the input are ignored and
/// fresh ones assigned. Fails only when the document is not an array.
pub fn parse_json<R: Read>(reader: R) -> ContactResult<Vec<RowResult>> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        _ => {
            return Err(ContactError::Import(
                "JSON import expects an array of contacts".to_string(),
            ))
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let position = idx as u64 + 1;
            parse_json_item(item).map_err(|error| RowFailure { position, error })
        })
        .collect())
}

fn parse_json_item(item: serde_json::Value) -> Result<Contact, RowError> {
    let raw: JsonContact =
        serde_json::from_value(item).map_err(|e| RowError::Malformed(e.to_string()))?;

    let new = NewContact {
        name: raw.name,
        phone: raw.phone,
        email: raw.email,
        tags: raw.tags.map(JsonTags::into_tag_set).unwrap_or_default(),
        favorite: raw.favorite,
    };

    Ok(new.into_contact()?)
}

/// Append every successfully parsed row to the store
pub fn import_rows(store: &mut ContactStore, rows: Vec<RowResult>) -> ContactResult<ImportReport> {
    let mut report = ImportReport::default();

    for row in rows {
        match row {
            Ok(contact) => {
                store.insert(contact.clone())?;
                report.imported.push(contact);
            }
            Err(failure) => report.failures.push(failure),
        }
    }

    Ok(report)
}

/// Replace the store with the successfully parsed rows. Refuses when no
/// row is usable, leaving the store as it was.
pub fn replace_with_rows(
    store: &mut ContactStore,
    rows: Vec<RowResult>,
) -> ContactResult<ImportReport> {
    let mut report = ImportReport::default();
    for row in rows {
        match row {
            Ok(contact) => report.imported.push(contact),
            Err(failure) => report.failures.push(failure),
        }
    }

    if report.imported.is_empty() {
        let mut message = "no valid contacts to replace the contact book with".to_string();
        if let Some(first) = report.failures.first() {
            message.push_str(&format!(
                " ({} row(s) rejected, first {})",
                report.failures.len(),
                first
            ));
        }
        return Err(ContactError::Import(message));
    }

    store.replace_all(report.imported.clone())?;
    Ok(report)
}
