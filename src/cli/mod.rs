//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the session and services.

pub mod backup;
pub mod contact;
pub mod merge;
pub mod transfer;

pub use backup::{handle_backup_command, BackupCommands};
pub use contact::{handle_contact_command, ContactCommands};
pub use merge::{handle_merge_command, MergeArgs};
pub use transfer::{handle_transfer_command, TransferCommands};
