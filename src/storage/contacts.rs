//! Contact repository backed by the primary CSV file
//!
//! Holds the ordered contact list in memory. Mutations only touch memory;
//! the file is rewritten atomically by [`ContactStore::save`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::error::{ContactError, ContactResult, ValidationError};
use crate::models::{parse_tags, Contact, ContactId, ContactUpdate, NewContact, UpdateOutcome};
use crate::services::merge::{merge_contacts, ConflictResolver, MergePolicy};
use crate::validation::{validate_email, validate_name, validate_phone};

use super::file_io::{read_bytes_optional, write_bytes_atomic};

/// Fixed column order of the primary file
pub const CSV_HEADER: [&str; 6] = ["id", "name", "phone", "email", "tags", "favorite"];

/// Shortest hex prefix accepted when resolving an id typed by the user
const MIN_ID_PREFIX: usize = 4;

/// Repository for contact persistence
#[derive(Debug, Clone)]
pub struct ContactStore {
    path: PathBuf,
    contacts: Vec<Contact>,
}

impl ContactStore {
    /// Create an empty store bound to `path` without reading it
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            contacts: Vec::new(),
        }
    }

    /// Load contacts from disk. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> ContactResult<Self> {
        let path = path.into();
        let contacts = match read_bytes_optional(&path)? {
            Some(bytes) => decode_contacts(&bytes, &path)?,
            None => Vec::new(),
        };
        Ok(Self { path, contacts })
    }

    /// Path of the primary file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save contacts to disk, atomically replacing the primary file
    pub fn save(&self) -> ContactResult<()> {
        let bytes = encode_contacts(&self.contacts)?;
        write_bytes_atomic(&self.path, &bytes)
    }

    /// Write a header-only primary file if none exists yet.
    /// Returns true when a file was created.
    pub fn ensure_exists(&self) -> ContactResult<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        write_bytes_atomic(&self.path, &encode_contacts(&[])?)?;
        Ok(true)
    }

    /// All contacts in insertion order
    pub fn all(&self) -> &[Contact] {
        &self.contacts
    }

    /// Count contacts
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// True when the store has no contacts
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Get a contact by ID
    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    /// Get a contact by ID or fail with `NotFound`
    pub fn get_required(&self, id: ContactId) -> ContactResult<&Contact> {
        self.get(id)
            .ok_or_else(|| ContactError::contact_not_found(id.to_string()))
    }

    /// Resolve user input (full UUID, `con-xxxxxxxx`, or a hex prefix) to an id
    pub fn resolve(&self, input: &str) -> ContactResult<ContactId> {
        let trimmed = input.trim();
        let lowered = trimmed.to_ascii_lowercase();
        let hex = lowered.strip_prefix(ContactId::PREFIX).unwrap_or(&lowered);
        if hex.len() < MIN_ID_PREFIX {
            return Err(ValidationError::Invalid(format!(
                "id '{}' is too short, give at least {} characters",
                trimmed, MIN_ID_PREFIX
            ))
            .into());
        }

        let mut matches = self.contacts.iter().filter(|c| c.id.matches(trimmed));
        match (matches.next(), matches.next()) {
            (Some(contact), None) => Ok(contact.id),
            (None, _) => Err(ContactError::contact_not_found(trimmed)),
            (Some(_), Some(_)) => Err(ValidationError::Invalid(format!(
                "id '{}' matches more than one contact",
                trimmed
            ))
            .into()),
        }
    }

    /// Validate and append a new contact
    pub fn add(&mut self, new: NewContact) -> ContactResult<Contact> {
        let contact = new.into_contact()?;
        self.contacts.push(contact.clone());
        Ok(contact)
    }

    /// Append an already-built contact, checking its fields and id uniqueness
    pub fn insert(&mut self, contact: Contact) -> ContactResult<()> {
        contact.validate()?;
        if self.get(contact.id).is_some() {
            return Err(ValidationError::Invalid(format!(
                "contact id {} already exists",
                contact.id
            ))
            .into());
        }
        self.contacts.push(contact);
        Ok(())
    }

    /// Apply field changes to a contact. Each field is validated on its own;
    /// rejected fields are reported in the outcome and the rest still apply.
    pub fn update(&mut self, id: ContactId, update: ContactUpdate) -> ContactResult<UpdateOutcome> {
        let index = self.index_of(id)?;
        let contact = &mut self.contacts[index];
        let mut rejected = Vec::new();

        if let Some(name) = update.name {
            match validate_name(&name) {
                Ok(name) => contact.name = name,
                Err(e) => rejected.push(e),
            }
        }

        if let Some(phone) = update.phone {
            match validate_phone(Some(&phone)) {
                Ok(phone) => contact.phone = phone,
                Err(e) => rejected.push(e),
            }
        }

        if let Some(email) = update.email {
            match validate_email(Some(&email)) {
                Ok(email) => contact.email = email,
                Err(e) => rejected.push(e),
            }
        }

        if let Some(tags) = update.tags {
            contact.tags = tags;
        }

        if let Some(favorite) = update.favorite {
            contact.favorite = favorite;
        }

        Ok(UpdateOutcome {
            contact: contact.clone(),
            rejected,
        })
    }

    /// Delete a contact, returning it
    pub fn delete(&mut self, id: ContactId) -> ContactResult<Contact> {
        let index = self.index_of(id)?;
        Ok(self.contacts.remove(index))
    }

    /// Fold contact `b` into contact `a`. The merged record keeps `a`'s id
    /// and position; `b` is removed for good.
    pub fn merge(
        &mut self,
        a: ContactId,
        b: ContactId,
        policy: MergePolicy,
        resolver: &mut dyn ConflictResolver,
    ) -> ContactResult<Contact> {
        if a == b {
            return Err(ValidationError::Invalid("cannot merge a contact with itself".into()).into());
        }

        let a_index = self.index_of(a)?;
        let b_index = self.index_of(b)?;

        let merged = merge_contacts(&self.contacts[a_index], &self.contacts[b_index], policy, resolver);
        self.contacts[a_index] = merged.clone();
        self.contacts.remove(b_index);

        Ok(merged)
    }

    /// Replace the whole contact list, checking invariants first
    pub fn replace_all(&mut self, contacts: Vec<Contact>) -> ContactResult<()> {
        let mut seen = HashSet::new();
        for contact in &contacts {
            contact.validate()?;
            if !seen.insert(contact.id) {
                return Err(ValidationError::Invalid(format!(
                    "duplicate contact id {}",
                    contact.id
                ))
                .into());
            }
        }
        self.contacts = contacts;
        Ok(())
    }

    fn index_of(&self, id: ContactId) -> ContactResult<usize> {
        self.contacts
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ContactError::contact_not_found(id.to_string()))
    }
}

/// Serialize contacts into the primary file format
pub fn encode_contacts(contacts: &[Contact]) -> ContactResult<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for contact in contacts {
        let id = contact.id.to_full_string();
        let tags = contact.tags_joined();
        writer.write_record([
            id.as_str(),
            contact.name.as_str(),
            contact.phone.as_deref().unwrap_or(""),
            contact.email.as_deref().unwrap_or(""),
            tags.as_str(),
            if contact.favorite { "1" } else { "0" },
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ContactError::Csv(format!("Failed to finish CSV output: {}", e)))
}

/// Parse the primary file format. Any malformed row is a `CorruptData` error
/// naming `source` and the line.
pub fn decode_contacts(bytes: &[u8], source: &Path) -> ContactResult<Vec<Contact>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| ContactError::corrupt(source, 1, e.to_string()))?
        .clone();
    if headers.iter().map(str::trim).ne(CSV_HEADER) {
        return Err(ContactError::corrupt(
            source,
            1,
            format!("expected header '{}'", CSV_HEADER.join(",")),
        ));
    }

    let mut contacts = Vec::new();
    let mut seen = HashSet::new();

    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            ContactError::corrupt(source, line, e.to_string())
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let contact =
            decode_record(&record).map_err(|detail| ContactError::corrupt(source, line, detail))?;

        if !seen.insert(contact.id) {
            return Err(ContactError::corrupt(
                source,
                line,
                format!("duplicate id {}", contact.id.to_full_string()),
            ));
        }
        contacts.push(contact);
    }

    Ok(contacts)
}

fn decode_record(record: &StringRecord) -> Result<Contact, String> {
    let field = |i: usize| record.get(i).unwrap_or("").trim();

    let id = ContactId::parse(field(0)).map_err(|e| format!("bad id '{}': {}", field(0), e))?;
    let name = validate_name(field(1)).map_err(|e| e.to_string())?;
    let phone = validate_phone(Some(field(2))).map_err(|e| e.to_string())?;
    let email = validate_email(Some(field(3))).map_err(|e| e.to_string())?;
    let tags = parse_tags(field(4));
    let favorite =
        parse_flag(field(5)).ok_or_else(|| format!("bad favorite flag '{}'", field(5)))?;

    Ok(Contact {
        id,
        name,
        phone,
        email,
        tags,
        favorite,
    })
}

/// Parse a boolean column value as the original files spell it
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::merge::NoPrompt;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, ContactStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = ContactStore::new(temp_dir.path().join("contacts.csv"));
        (temp_dir, store)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (_temp, store) = create_test_store();
        let loaded = ContactStore::load(store.path()).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_round_trip_after_add_update_delete() {
        let (_temp, mut store) = create_test_store();

        let ann = store
            .add(NewContact::named("Ann Lee").with_phone("+1 555-0100").with_tags("work,friend"))
            .unwrap();
        let bob = store
            .add(NewContact::named("Bob, Jr.").with_email("bob@example.com").favorite(true))
            .unwrap();
        store.add(NewContact::named("Cara \"CJ\" Jones")).unwrap();
        store
            .update(
                ann.id,
                ContactUpdate {
                    email: Some("ann@example.com".into()),
                    ..ContactUpdate::default()
                },
            )
            .unwrap();
        store.delete(bob.id).unwrap();
        store.save().unwrap();

        let loaded = ContactStore::load(store.path()).unwrap();
        assert_eq!(loaded.all(), store.all());
        assert_eq!(loaded.all()[0].tags_joined(), "friend,work");
    }

    #[test]
    fn test_tags_field_is_quoted() {
        let (_temp, mut store) = create_test_store();
        store.add(NewContact::named("Ann").with_tags("b,a")).unwrap();
        store.save().unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("id,name,phone,email,tags,favorite\n"));
        assert!(text.contains(",\"a,b\",0"));
    }

    #[test]
    fn test_ensure_exists_writes_header_once() {
        let (_temp, store) = create_test_store();
        assert!(store.ensure_exists().unwrap());
        assert!(!store.ensure_exists().unwrap());
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "id,name,phone,email,tags,favorite\n"
        );
    }

    #[test]
    fn test_corrupt_row_is_reported_not_dropped() {
        let (_temp, store) = create_test_store();
        fs::write(
            store.path(),
            "id,name,phone,email,tags,favorite\nnot-a-uuid,Ann,,,,0\n",
        )
        .unwrap();

        let err = ContactStore::load(store.path()).unwrap_err();
        match err {
            ContactError::CorruptData { line, detail, .. } => {
                assert_eq!(line, 2);
                assert!(detail.contains("bad id"));
            }
            other => panic!("expected CorruptData, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_column_count_is_corrupt() {
        let (_temp, store) = create_test_store();
        fs::write(
            store.path(),
            "id,name,phone,email,tags,favorite\n550e8400-e29b-41d4-a716-446655440000,Ann\n",
        )
        .unwrap();

        assert!(matches!(
            ContactStore::load(store.path()),
            Err(ContactError::CorruptData { .. })
        ));
    }

    #[test]
    fn test_wrong_header_is_corrupt() {
        let (_temp, store) = create_test_store();
        fs::write(store.path(), "name,phone,email,tags,favorite\nAnn,,,,0\n").unwrap();

        assert!(matches!(
            ContactStore::load(store.path()),
            Err(ContactError::CorruptData { line: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_id_is_corrupt() {
        let (_temp, store) = create_test_store();
        let row = "550e8400-e29b-41d4-a716-446655440000,Ann,,,,0";
        fs::write(
            store.path(),
            format!("id,name,phone,email,tags,favorite\n{row}\n{row}\n"),
        )
        .unwrap();

        assert!(matches!(
            ContactStore::load(store.path()),
            Err(ContactError::CorruptData { line: 3, .. })
        ));
    }

    #[test]
    fn test_update_and_delete_missing_id() {
        let (_temp, mut store) = create_test_store();
        let ghost = ContactId::new();

        assert!(store
            .update(ghost, ContactUpdate::default())
            .unwrap_err()
            .is_not_found());
        assert!(store.delete(ghost).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_rejects_only_the_bad_field() {
        let (_temp, mut store) = create_test_store();
        let ann = store.add(NewContact::named("Ann")).unwrap();

        let outcome = store
            .update(
                ann.id,
                ContactUpdate {
                    phone: Some("abc".into()),
                    email: Some("ann@example.com".into()),
                    favorite: Some(true),
                    ..ContactUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(outcome.rejected, vec![ValidationError::InvalidPhone("abc".into())]);
        assert_eq!(outcome.contact.email.as_deref(), Some("ann@example.com"));
        assert!(outcome.contact.favorite);
        assert!(outcome.contact.phone.is_none());
    }

    #[test]
    fn test_update_blank_clears_field() {
        let (_temp, mut store) = create_test_store();
        let ann = store
            .add(NewContact::named("Ann").with_phone("5550100123"))
            .unwrap();

        let outcome = store
            .update(
                ann.id,
                ContactUpdate {
                    phone: Some(String::new()),
                    ..ContactUpdate::default()
                },
            )
            .unwrap();
        assert!(outcome.contact.phone.is_none());
    }

    #[test]
    fn test_add_does_not_touch_disk() {
        let (_temp, mut store) = create_test_store();
        store.add(NewContact::named("Ann")).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_resolve_short_forms() {
        let (_temp, mut store) = create_test_store();
        let ann = store.add(NewContact::named("Ann")).unwrap();

        assert_eq!(store.resolve(&ann.id.to_string()).unwrap(), ann.id);
        assert_eq!(store.resolve(&ann.id.to_full_string()).unwrap(), ann.id);
        assert!(store.resolve("con-").unwrap_err().is_validation());

        let short = ann.id.to_string().to_uppercase();
        assert_eq!(store.resolve(&short).unwrap(), ann.id);
        let one_digit = format!("CON-{}", &ann.id.to_full_string()[..1]);
        assert!(store.resolve(&one_digit).unwrap_err().is_validation());
    }

    #[test]
    fn test_merge_removes_loser_permanently() {
        let (_temp, mut store) = create_test_store();
        let a = store.add(NewContact::named("Ann Lee").with_tags("work")).unwrap();
        let b = store.add(NewContact::named("Anne Lee").with_tags("friend")).unwrap();

        let merged = store.merge(a.id, b.id, MergePolicy::KeepA, &mut NoPrompt).unwrap();

        assert_eq!(merged.id, a.id);
        assert_eq!(store.len(), 1);
        assert!(store.get(b.id).is_none());
        assert!(store.merge(a.id, a.id, MergePolicy::KeepA, &mut NoPrompt).is_err());
        assert!(store
            .merge(a.id, b.id, MergePolicy::KeepA, &mut NoPrompt)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_replace_all_rejects_duplicate_ids() {
        let (_temp, mut store) = create_test_store();
        let ann = Contact::new("Ann");
        assert!(store.replace_all(vec![ann.clone(), ann]).is_err());
    }

    #[test]
    fn test_parse_flag_variants() {
        assert_eq!(parse_flag("Yes"), Some(true));
        assert_eq!(parse_flag(""), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
