//! Field validation for contact data
//!
//! Pure functions with no side effects. The `is_valid_*` predicates let a
//! caller decide between warning and rejecting; the `validate_*` functions
//! return the trimmed value or a typed [`ValidationError`].

use crate::error::ValidationError;

/// Minimum number of digits in a phone number
pub const MIN_PHONE_DIGITS: usize = 7;

/// Maximum number of digits in a phone number
pub const MAX_PHONE_DIGITS: usize = 15;

/// Check a phone number: optional leading `+`, digits, and the separators
/// space, `-`, `.`, `(` and `)`, with 7 to 15 digits in total.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    let body = phone.strip_prefix('+').unwrap_or(phone);

    let mut digits = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return false,
        }
    }

    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

/// Check an email address: `local@domain`, where the domain contains at
/// least one `.` and no label is empty. Whitespace is never allowed.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }

    domain.split('.').all(|label| !label.is_empty())
}

/// Strip a phone number down to its digits
pub fn normalize_phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Validate a contact name, returning it trimmed
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyName)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Validate an optional phone number. Blank input means "no phone".
pub fn validate_phone(phone: Option<&str>) -> Result<Option<String>, ValidationError> {
    match trim_optional(phone) {
        None => Ok(None),
        Some(p) if is_valid_phone(&p) => Ok(Some(p)),
        Some(p) => Err(ValidationError::InvalidPhone(p)),
    }
}

/// Validate an optional email address. Blank input means "no email".
pub fn validate_email(email: Option<&str>) -> Result<Option<String>, ValidationError> {
    match trim_optional(email) {
        None => Ok(None),
        Some(e) if is_valid_email(&e) => Ok(Some(e)),
        Some(e) => Err(ValidationError::InvalidEmail(e)),
    }
}

/// Trims an optional string, returning None if blank.
pub fn trim_optional(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
