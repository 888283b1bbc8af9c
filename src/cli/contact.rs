//! Contact CLI commands
//!
//! Implements CLI commands for contact management.

use clap::{builder::BoolishValueParser, Subcommand};

use crate::display::{format_contact_details, format_contact_list, sort_contacts, SortKey};
use crate::error::{ContactError, ContactResult, ValidationError};
use crate::models::{parse_tags, Contact, ContactUpdate, NewContact};
use crate::services::merge::similarity;
use crate::services::search::{self, SearchQuery};
use crate::session::Session;

/// Contact subcommands
#[derive(Subcommand, Debug)]
pub enum ContactCommands {
    /// Add a new contact
    Add {
        /// Contact name
        name: String,
        /// Phone number
        #[arg(short, long)]
        phone: Option<String>,
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,
        /// Mark as favorite
        #[arg(short, long)]
        favorite: bool,
    },

    /// List all contacts
    View {
        /// Sort order
        #[arg(short, long, value_enum, default_value_t = SortKey::Name)]
        sort: SortKey,
    },

    /// Show contact details
    Show {
        /// Contact ID (con-xxxxxxxx, full UUID or a prefix)
        id: String,
    },

    /// Search name, phone, email and tags (wrap in /.../ for a regex)
    Search {
        /// Substring or /regex/
        term: String,
    },

    /// Change fields of a contact
    Update {
        /// Contact ID
        id: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New phone number (empty string clears it)
        #[arg(short, long)]
        phone: Option<String>,
        /// New email address (empty string clears it)
        #[arg(short, long)]
        email: Option<String>,
        /// Replace tags with this comma-separated list
        #[arg(short, long)]
        tags: Option<String>,
        /// Set or clear the favorite flag
        #[arg(short, long, value_parser = BoolishValueParser::new())]
        favorite: Option<bool>,
    },

    /// Delete a contact
    Delete {
        /// Contact ID
        id: String,
    },
}

impl ContactCommands {
    /// Operation name used in the error log
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::View { .. } => "view",
            Self::Show { .. } => "show",
            Self::Search { .. } => "search",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Handle a contact command
pub fn handle_contact_command(session: &mut Session, cmd: ContactCommands) -> ContactResult<()> {
    match cmd {
        ContactCommands::Add {
            name,
            phone,
            email,
            tags,
            favorite,
        } => {
            let threshold = session.settings().merge.similarity_threshold;
            let similar: Vec<Contact> = session
                .store()
                .all()
                .iter()
                .filter(|c| similarity(&c.name, &name) >= threshold)
                .cloned()
                .collect();

            let new = NewContact {
                name,
                phone,
                email,
                tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
                favorite,
            };
            let contact = session.mutate("add", |store| store.add(new))?;

            println!("Added contact: {}", contact.name);
            println!("  ID: {}", contact.id);

            if !similar.is_empty() {
                println!();
                println!("Possible duplicates:");
                for other in &similar {
                    println!("  - {}", other);
                }
                println!("Run 'contacts merge' to combine them.");
            }
        }

        ContactCommands::View { sort } => {
            let mut contacts: Vec<&Contact> = session.store().all().iter().collect();
            sort_contacts(&mut contacts, sort);
            println!("{}", format_contact_list(&contacts));
        }

        ContactCommands::Show { id } => {
            let id = session.store().resolve(&id)?;
            let contact = session.store().get_required(id)?;
            print!("{}", format_contact_details(contact));
        }

        ContactCommands::Search { term } => {
            let query = SearchQuery::parse(&term)?;
            let mut found = search::search(session.store().all(), &query);
            sort_contacts(&mut found, SortKey::Name);
            println!("{}", format_contact_list(&found));
        }

        ContactCommands::Update {
            id,
            name,
            phone,
            email,
            tags,
            favorite,
        } => {
            let update = ContactUpdate {
                name,
                phone,
                email,
                tags: tags.as_deref().map(parse_tags),
                favorite,
            };
            if update.is_empty() {
                return Err(ValidationError::Invalid(
                    "nothing to update, pass at least one field".to_string(),
                )
                .into());
            }

            let id = session.store().resolve(&id)?;
            let outcome = session.mutate("update", |store| {
                let before = store.get_required(id)?.clone();
                let outcome = store.update(id, update)?;
                match outcome.rejected.first() {
                    // Every requested change was rejected
                    Some(err) if outcome.contact == before => Err(err.clone().into()),
                    _ => Ok(outcome),
                }
            })?;

            if !outcome.fully_applied() {
                for rejected in &outcome.rejected {
                    let err = ContactError::from(rejected.clone());
                    session.record_error("update", &err);
                    eprintln!("Warning: {} (field left unchanged)", err);
                }
            }

            println!("Updated contact: {}", outcome.contact.name);
            print!("{}", format_contact_details(&outcome.contact));
        }

        ContactCommands::Delete { id } => {
            let id = session.store().resolve(&id)?;
            let removed = session.mutate("delete", |store| store.delete(id))?;
            println!("Deleted contact: {}", removed);
            println!("Run 'contacts undo' to bring it back.");
        }
    }

    Ok(())
}
