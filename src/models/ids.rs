//! Strongly-typed ID wrappers
//!
//! Contact ids are random UUIDs, so an id is never handed out twice even
//! after the contact it belonged to has been deleted or merged away.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Prefix used by the short display form
            pub const PREFIX: &'static str = $display_prefix;

            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse an ID from a full UUID string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Full hyphenated UUID, as stored on disk
            pub fn to_full_string(&self) -> String {
                self.0.hyphenated().to_string()
            }

            /// Check whether user input refers to this id: the full UUID, the
            /// short display form, or a hex prefix of the UUID.
            pub fn matches(&self, input: &str) -> bool {
                let input = input.trim().to_ascii_lowercase();
                let hex = input.strip_prefix($display_prefix).unwrap_or(&input);
                !hex.is_empty() && self.to_full_string().starts_with(hex)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(ContactId, "con-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_id_creation() {
        let id = ContactId::new();
        assert!(!id.as_uuid().is_nil());
    }

    #[test]
    fn test_id_display() {
        let id = ContactId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("con-"));
        assert_eq!(display.len(), 12); // "con-" + 8 chars
    }

    #[test]
    fn test_ids_are_unique() {
        let id1 = ContactId::new();
        let id2 = ContactId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_id_parse_round_trip() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id = ContactId::parse(uuid_str).unwrap();
        assert_eq!(id.to_full_string(), uuid_str);
        assert_eq!(uuid_str.parse::<ContactId>().unwrap(), id);
    }

    #[test]
    fn test_id_matches_short_forms() {
        let id = ContactId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert!(id.matches("con-550e8400"));
        assert!(id.matches("550e"));
        assert!(id.matches("550E8400-E29B-41D4-A716-446655440000"));
        assert!(!id.matches("con-"));
        assert!(!id.matches("660e"));
    }
}
