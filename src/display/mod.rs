//! Display formatting for terminal output
//!
//! Provides utilities for formatting contacts and backups for terminal
//! display.

pub mod backup;
pub mod contact;

pub use backup::{format_backup_list, format_size};
pub use contact::{format_contact_details, format_contact_list, sort_contacts, SortKey};
