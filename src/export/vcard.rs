//! vCard 3.0 export

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ContactResult;
use crate::models::Contact;
use crate::storage::write_bytes_atomic;

fn unsafe_filename_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]").expect("valid filename regex"))
}

/// File name for a contact's card: the name with anything outside
/// `[A-Za-z0-9_-]` replaced by `_`, plus `.vcf`
pub fn vcard_filename(contact: &Contact) -> String {
    let stem = unsafe_filename_chars().replace_all(contact.name.trim(), "_");
    format!("{}.vcf", stem)
}

/// Escape a text value per RFC 2426
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Structured `N` value: last word is the family name, the rest given names
fn structured_name(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.split_last() {
        Some((family, [])) => format!("{};;;;", escape(family)),
        Some((family, given)) => format!("{};{};;;", escape(family), escape(&given.join(" "))),
        None => ";;;;".to_string(),
    }
}

/// Render a contact as a vCard 3.0 document
pub fn render_vcard(contact: &Contact) -> String {
    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("N:{}", structured_name(&contact.name)),
        format!("FN:{}", escape(contact.name.trim())),
    ];

    if let Some(phone) = &contact.phone {
        lines.push(format!("TEL;TYPE=CELL:{}", escape(phone)));
    }
    if let Some(email) = &contact.email {
        lines.push(format!("EMAIL;TYPE=INTERNET:{}", escape(email)));
    }
    if !contact.tags.is_empty() {
        let categories: Vec<String> = contact.tags.iter().map(|t| escape(t)).collect();
        lines.push(format!("CATEGORIES:{}", categories.join(",")));
    }

    lines.push("END:VCARD".to_string());

    let mut card = lines.join("\r\n");
    card.push_str("\r\n");
    card
}

/// Write a contact's card into `dir`, returning the file path
pub fn export_vcard(contact: &Contact, dir: &Path) -> ContactResult<PathBuf> {
    let path = dir.join(vcard_filename(contact));
    write_bytes_atomic(&path, render_vcard(contact).as_bytes())?;
    Ok(path)
}
