//! Error logging for the contact book
//!
//! Every error a command catches is appended to a plain-text log before it
//! is reported to the user.
//!
//! - `ErrorEntry`: one timestamped line with the operation and error detail
//! - `ErrorLog`: appends entries, swallowing its own write failures

mod entry;
mod logger;

pub use entry::ErrorEntry;
pub use logger::ErrorLog;
