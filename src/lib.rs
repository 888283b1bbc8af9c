//! Contact Book - a terminal contact manager
//!
//! Contacts live in a single CSV file. On top of plain CRUD the crate offers
//! substring and regex search, tags, favorites, JSON and vCard export, bulk
//! CSV/JSON import, and a safety net of daily backups, a single-level undo
//! and a confirm-first fuzzy duplicate merge.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Data directory paths and persisted settings
//! - `error`: Custom error types
//! - `validation`: Phone, email and name checks
//! - `models`: The contact record and its id
//! - `storage`: The primary CSV file and atomic writes
//! - `backup`: Daily backups and undo snapshots
//! - `services`: Search, bulk import and duplicate merging
//! - `export`: JSON and vCard output
//! - `log`: Append-only error log
//! - `session`: Per-command context that runs every change through the
//!   safety net
//! - `cli` / `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use contact_book::config::ContactPaths;
//! use contact_book::models::NewContact;
//! use contact_book::session::Session;
//!
//! let mut session = Session::open(ContactPaths::new()?)?;
//! session.mutate("add", |store| store.add(NewContact::named("Ann Lee")))?;
//! session.undo()?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod log;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;
pub mod validation;

pub use error::{ContactError, ContactResult, ValidationError};
