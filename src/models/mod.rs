//! Core data models for the contact book

pub mod contact;
pub mod ids;

pub use contact::{
    join_tags, parse_tags, Contact, ContactUpdate, NewContact, TagSet, UpdateOutcome,
};
pub use ids::ContactId;
