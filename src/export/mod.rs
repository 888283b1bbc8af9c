//! Export module for the contact book
//!
//! - JSON: the (optionally filtered) contact list as one array
//! - vCard: a single contact as a vCard 3.0 file

pub mod json;
pub mod vcard;

pub use json::{export_json, export_json_file, DEFAULT_JSON_FILE};
pub use vcard::{export_vcard, render_vcard, vcard_filename};
