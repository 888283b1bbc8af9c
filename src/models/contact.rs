//! Contact model
//!
//! One person's entry in the contact book, plus the input shapes used to
//! create and edit it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::ids::ContactId;
use crate::error::ValidationError;
use crate::validation::{is_valid_email, is_valid_phone, validate_email, validate_name, validate_phone};

/// A set of tags, kept sorted so serialization is stable
pub type TagSet = BTreeSet<String>;

/// A contact record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique identifier
    pub id: ContactId,

    /// Display name, never empty
    pub name: String,

    /// Phone number as entered
    pub phone: Option<String>,

    /// Email address
    pub email: Option<String>,

    /// Free-form tags
    #[serde(default)]
    pub tags: TagSet,

    /// Favorite flag
    #[serde(default)]
    pub favorite: bool,
}

impl Contact {
    /// Create a contact with a fresh id and no optional fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ContactId::new(),
            name: name.into(),
            phone: None,
            email: None,
            tags: TagSet::new(),
            favorite: false,
        }
    }

    /// Check every field against the store invariants
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if let Some(phone) = &self.phone {
            if !is_valid_phone(phone) {
                return Err(ValidationError::InvalidPhone(phone.clone()));
            }
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                return Err(ValidationError::InvalidEmail(email.clone()));
            }
        }
        Ok(())
    }

    /// Case-insensitive exact tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Tags joined into the single-field storage form
    pub fn tags_joined(&self) -> String {
        join_tags(&self.tags)
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Split a comma-separated tag field into a tag set. Tags are lowercased,
/// so "Work" and "work" are one tag.
pub fn parse_tags(field: &str) -> TagSet {
    field
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Join a tag set into a comma-separated field
pub fn join_tags(tags: &TagSet) -> String {
    tags.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

/// Input for creating a contact
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tags: TagSet,
    pub favorite: bool,
}

impl NewContact {
    /// Start a new contact with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Set the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the tags from a comma-separated string
    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = parse_tags(tags);
        self
    }

    /// Mark as favorite
    pub fn favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    /// Validate every field and build a contact with a fresh id
    pub fn into_contact(self) -> Result<Contact, ValidationError> {
        let name = validate_name(&self.name)?;
        let phone = validate_phone(self.phone.as_deref())?;
        let email = validate_email(self.email.as_deref())?;

        Ok(Contact {
            id: ContactId::new(),
            name,
            phone,
            email,
            tags: self.tags,
            favorite: self.favorite,
        })
    }
}

/// Field changes for an existing contact. `None` leaves a field alone; a
/// blank phone or email clears it.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tags: Option<TagSet>,
    pub favorite: Option<bool>,
}

impl ContactUpdate {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.tags.is_none()
            && self.favorite.is_none()
    }
}

/// Result of applying a [`ContactUpdate`]
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    /// The contact after all accepted changes
    pub contact: Contact,
    /// Fields whose change was rejected, with the reason
    pub rejected: Vec<ValidationError>,
}

impl UpdateOutcome {
    /// True when every requested change was applied
    pub fn fully_applied(&self) -> bool {
        self.rejected.is_empty()
    }
}
