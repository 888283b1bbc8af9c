//! Storage layer for the contact book
//!
//! The primary CSV file with atomic writes and strict parsing.

pub mod contacts;
pub mod file_io;

pub use contacts::{decode_contacts, encode_contacts, ContactStore, CSV_HEADER};
pub use file_io::{read_bytes_optional, write_bytes_atomic, write_json_atomic};
