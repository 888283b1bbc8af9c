//! Contact display formatting
//!
//! Formats contacts for terminal output in table and detail views.

use std::cmp::Ordering;

use clap::ValueEnum;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Contact;

/// Column to sort the contact table by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Name, case-insensitive
    #[default]
    Name,
    /// Phone number, contacts without one last
    Phone,
    /// Email address, contacts without one last
    Email,
    /// Favorites first, then by name
    Favorite,
}

fn compare_optional(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort contacts in place. Stable, so equal keys keep store order.
pub fn sort_contacts(contacts: &mut [&Contact], key: SortKey) {
    let by_name = |a: &Contact, b: &Contact| a.name.to_lowercase().cmp(&b.name.to_lowercase());

    contacts.sort_by(|a, b| match key {
        SortKey::Name => by_name(a, b),
        SortKey::Phone => compare_optional(a.phone.as_deref(), b.phone.as_deref()),
        SortKey::Email => compare_optional(a.email.as_deref(), b.email.as_deref()),
        SortKey::Favorite => b.favorite.cmp(&a.favorite).then_with(|| by_name(a, b)),
    });
}

#[derive(Tabled)]
struct ContactRow {
    #[tabled(rename = "")]
    favorite: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&Contact> for ContactRow {
    fn from(contact: &Contact) -> Self {
        Self {
            favorite: if contact.favorite { "*" } else { "" },
            id: contact.id.to_string(),
            name: contact.name.clone(),
            phone: contact.phone.clone().unwrap_or_default(),
            email: contact.email.clone().unwrap_or_default(),
            tags: contact.tags.iter().cloned().collect::<Vec<_>>().join(", "),
        }
    }
}

/// Format a list of contacts as a table
pub fn format_contact_list(contacts: &[&Contact]) -> String {
    if contacts.is_empty() {
        return "No contacts found.".to_string();
    }

    let rows = contacts.iter().map(|c| ContactRow::from(*c));
    let mut table = Table::new(rows);
    table.with(Style::sharp());

    format!("{}\n{} contact(s)", table, contacts.len())
}

/// Format a single contact's details
pub fn format_contact_details(contact: &Contact) -> String {
    let mut output = String::new();

    output.push_str(&format!("Contact: {}\n", contact.name));
    output.push_str(&format!("  ID:        {}\n", contact.id));
    output.push_str(&format!("  UUID:      {}\n", contact.id.to_full_string()));
    output.push_str(&format!(
        "  Phone:     {}\n",
        contact.phone.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "  Email:     {}\n",
        contact.email.as_deref().unwrap_or("-")
    ));

    if !contact.tags.is_empty() {
        output.push_str(&format!("  Tags:      {}\n", contact.tags_joined()));
    }

    output.push_str(&format!(
        "  Favorite:  {}\n",
        if contact.favorite { "Yes" } else { "No" }
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewContact;

    fn sample() -> Vec<Contact> {
        vec![
            NewContact::named("cara Diaz").into_contact().unwrap(),
            NewContact::named("Ann Lee")
                .with_phone("555-0200")
                .into_contact()
                .unwrap(),
            NewContact::named("Bob Stone")
                .with_phone("555-0100")
                .favorite(true)
                .into_contact()
                .unwrap(),
        ]
    }

    fn names(contacts: &[&Contact]) -> Vec<String> {
        contacts.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let contacts = sample();
        let mut view: Vec<&Contact> = contacts.iter().collect();
        sort_contacts(&mut view, SortKey::Name);
        assert_eq!(names(&view), vec!["Ann Lee", "Bob Stone", "cara Diaz"]);
    }

    #[test]
    fn test_sort_by_phone_puts_missing_last() {
        let contacts = sample();
        let mut view: Vec<&Contact> = contacts.iter().collect();
        sort_contacts(&mut view, SortKey::Phone);
        assert_eq!(names(&view), vec!["Bob Stone", "Ann Lee", "cara Diaz"]);
    }

    #[test]
    fn test_sort_by_favorite() {
        let contacts = sample();
        let mut view: Vec<&Contact> = contacts.iter().collect();
        sort_contacts(&mut view, SortKey::Favorite);
        assert_eq!(view[0].name, "Bob Stone");
        assert_eq!(view[1].name, "Ann Lee");
    }

    #[test]
    fn test_table_lists_every_contact() {
        let contacts = sample();
        let view: Vec<&Contact> = contacts.iter().collect();
        let table = format_contact_list(&view);

        for contact in &contacts {
            assert!(table.contains(&contact.name));
            assert!(table.contains(&contact.id.to_string()));
        }
        assert!(table.ends_with("3 contact(s)"));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_contact_list(&[]), "No contacts found.");
    }

    #[test]
    fn test_details() {
        let contact = NewContact::named("Ann Lee")
            .with_tags("work")
            .into_contact()
            .unwrap();
        let details = format_contact_details(&contact);

        assert!(details.starts_with("Contact: Ann Lee"));
        assert!(details.contains("Phone:     -"));
        assert!(details.contains("Tags:      work"));
        assert!(details.contains("Favorite:  No"));
    }
}
