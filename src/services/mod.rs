//! Service layer for the contact book
//!
//! Logic that sits on top of the record store: searching, bulk import and
//! the fuzzy-duplicate merge engine.

pub mod import;
pub mod merge;
pub mod search;

pub use import::{ImportReport, RowFailure};
pub use merge::{ConflictResolver, MergePolicy, NoPrompt};
pub use search::{ContactFilter, SearchQuery};
