//! Contact search
//!
//! A query is either a case-insensitive substring or, when wrapped in
//! slashes (`/pattern/`), a case-insensitive regular expression. Both look
//! at name, phone, email and tags.

use regex::{Regex, RegexBuilder};

use crate::error::ValidationError;
use crate::models::Contact;

/// A parsed search query
#[derive(Debug, Clone)]
pub enum SearchQuery {
    /// Lowercased substring
    Substring(String),
    /// Compiled case-insensitive pattern
    Pattern(Regex),
}

impl SearchQuery {
    /// Parse user input. `/.../` selects regex mode.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationError::Invalid("search term cannot be empty".into()));
        }

        match input
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(pattern) if !pattern.is_empty() => RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map(Self::Pattern)
                .map_err(|e| ValidationError::InvalidPattern(e.to_string())),
            _ => Ok(Self::Substring(input.to_lowercase())),
        }
    }

    /// Check one contact
    pub fn matches(&self, contact: &Contact) -> bool {
        let tags = contact.tags_joined();
        let fields = [
            contact.name.as_str(),
            contact.phone.as_deref().unwrap_or(""),
            contact.email.as_deref().unwrap_or(""),
            tags.as_str(),
        ];

        match self {
            Self::Substring(needle) => fields
                .iter()
                .any(|field| field.to_lowercase().contains(needle.as_str())),
            Self::Pattern(regex) => fields.iter().any(|field| regex.is_match(field)),
        }
    }
}

/// Contacts matching `query`, in store order
pub fn search<'a>(contacts: &'a [Contact], query: &SearchQuery) -> Vec<&'a Contact> {
    contacts.iter().filter(|c| query.matches(c)).collect()
}

/// Filter used by the JSON export
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    /// Only favorites
    pub favorites_only: bool,
    /// Only contacts carrying this tag (case-insensitive)
    pub tag: Option<String>,
}

impl ContactFilter {
    /// Check one contact
    pub fn matches(&self, contact: &Contact) -> bool {
        if self.favorites_only && !contact.favorite {
            return false;
        }
        match &self.tag {
            Some(tag) => contact.has_tag(tag),
            None => true,
        }
    }

    /// Contacts passing the filter, in store order
    pub fn apply<'a>(&self, contacts: &'a [Contact]) -> Vec<&'a Contact> {
        contacts.iter().filter(|c| self.matches(c)).collect()
    }
}
