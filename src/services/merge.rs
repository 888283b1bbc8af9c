//! Duplicate detection and merging
//!
//! Merging is a two-step affair: [`find_candidates`] proposes pairs of
//! contacts with similar names, and the caller merges a pair only after the
//! user confirms it. Nothing here touches disk.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::Contact;
use crate::validation::{is_valid_email, is_valid_phone, normalize_phone_digits};

/// How to settle a field where both contacts hold different values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Keep the first contact's value
    #[default]
    KeepA,
    /// Keep the second contact's value
    KeepB,
    /// Ask for each conflicting field
    Prompt,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepA => write!(f, "keep-a"),
            Self::KeepB => write!(f, "keep-b"),
            Self::Prompt => write!(f, "prompt"),
        }
    }
}

/// A field that can conflict during a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Phone,
    Email,
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phone => write!(f, "phone"),
            Self::Email => write!(f, "email"),
        }
    }
}

/// Which contact's value wins a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

/// Settles conflicts under [`MergePolicy::Prompt`]
pub trait ConflictResolver {
    fn resolve(&mut self, field: ConflictField, a: &str, b: &str) -> Side;
}

/// Resolver for non-interactive callers; always keeps the first value
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl ConflictResolver for NoPrompt {
    fn resolve(&mut self, _field: ConflictField, _a: &str, _b: &str) -> Side {
        Side::A
    }
}

/// Two contacts whose names look alike
#[derive(Debug, Clone, Copy)]
pub struct CandidatePair<'a> {
    pub a: &'a Contact,
    pub b: &'a Contact,
    /// Name similarity in 0.0..=1.0
    pub score: f64,
}

/// Levenshtein edit distance over chars
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Name similarity (0.0 to 1.0): one minus the edit distance divided by the
/// longer length, ignoring case and surrounding whitespace
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }

    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

/// Lazily yield every unordered pair of contacts whose names score at or
/// above `threshold`, in store order. Borrowing the slice means a fresh call
/// is needed after the store changes.
pub fn find_candidates(
    contacts: &[Contact],
    threshold: f64,
) -> impl Iterator<Item = CandidatePair<'_>> + '_ {
    (0..contacts.len())
        .flat_map(move |i| ((i + 1)..contacts.len()).map(move |j| (i, j)))
        .filter_map(move |(i, j)| {
            let (a, b) = (&contacts[i], &contacts[j]);
            let score = similarity(&a.name, &b.name);
            (score >= threshold).then_some(CandidatePair { a, b, score })
        })
}

/// Combine two contacts into one that keeps `a`'s id.
///
/// - name: the more complete one, counted in name parts (ties keep `a`)
/// - phone/email: a lone value wins; equal values keep `a`'s; a valid value
///   beats an invalid one; otherwise `policy` decides
/// - tags: union
/// - favorite: either
pub fn merge_contacts(
    a: &Contact,
    b: &Contact,
    policy: MergePolicy,
    resolver: &mut dyn ConflictResolver,
) -> Contact {
    let name = if name_parts(&b.name) > name_parts(&a.name) {
        b.name.clone()
    } else {
        a.name.clone()
    };

    let phone = pick_value(
        ConflictField::Phone,
        a.phone.as_deref(),
        b.phone.as_deref(),
        policy,
        resolver,
    );
    let email = pick_value(
        ConflictField::Email,
        a.email.as_deref(),
        b.email.as_deref(),
        policy,
        resolver,
    );

    Contact {
        id: a.id,
        name,
        phone,
        email,
        tags: a.tags.union(&b.tags).cloned().collect(),
        favorite: a.favorite || b.favorite,
    }
}

fn pick_value(
    field: ConflictField,
    a: Option<&str>,
    b: Option<&str>,
    policy: MergePolicy,
    resolver: &mut dyn ConflictResolver,
) -> Option<String> {
    let (a, b) = match (non_blank(a), non_blank(b)) {
        (None, None) => return None,
        (Some(a), None) => return Some(a.to_string()),
        (None, Some(b)) => return Some(b.to_string()),
        (Some(a), Some(b)) => (a, b),
    };

    if same_value(field, a, b) {
        return Some(a.to_string());
    }

    let side = match (is_valid(field, a), is_valid(field, b)) {
        (true, false) => Side::A,
        (false, true) => Side::B,
        _ => match policy {
            MergePolicy::KeepA => Side::A,
            MergePolicy::KeepB => Side::B,
            MergePolicy::Prompt => resolver.resolve(field, a, b),
        },
    };

    Some(match side {
        Side::A => a.to_string(),
        Side::B => b.to_string(),
    })
}

fn name_parts(name: &str) -> usize {
    name.split_whitespace().count()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn same_value(field: ConflictField, a: &str, b: &str) -> bool {
    match field {
        ConflictField::Phone => normalize_phone_digits(a) == normalize_phone_digits(b),
        ConflictField::Email => a.eq_ignore_ascii_case(b),
    }
}

fn is_valid(field: ConflictField, value: &str) -> bool {
    match field {
        ConflictField::Phone => is_valid_phone(value),
        ConflictField::Email => is_valid_email(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_tags, NewContact};

    struct Scripted(Vec<Side>, Vec<ConflictField>);

    impl ConflictResolver for Scripted {
        fn resolve(&mut self, field: ConflictField, _a: &str, _b: &str) -> Side {
            self.1.push(field);
            self.0.remove(0)
        }
    }

    fn contact(name: &str) -> Contact {
        NewContact::named(name).into_contact().unwrap()
    }

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_similarity_ignores_case_and_spacing() {
        assert_eq!(similarity(" ANN LEE ", "ann lee"), 1.0);
        assert!((similarity("Ann Lee", "Anne Lee") - 0.875).abs() < 1e-9);
        assert!(similarity("Ann Lee", "Bob Stone") < 0.5);
    }

    #[test]
    fn test_find_candidates_example_pair() {
        let mut ann = contact("Ann Lee");
        ann.phone = Some("+1 555-0100".into());
        ann.tags = parse_tags("work");
        let mut anne = contact("Anne Lee");
        anne.phone = Some("+1 555-0100".into());
        anne.tags = parse_tags("friend");
        let bob = contact("Bob Stone");
        let contacts = vec![ann.clone(), bob, anne.clone()];

        let pairs: Vec<_> = find_candidates(&contacts, 0.85).collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].a.id, ann.id);
        assert_eq!(pairs[0].b.id, anne.id);

        let merged = merge_contacts(pairs[0].a, pairs[0].b, MergePolicy::KeepA, &mut NoPrompt);
        assert_eq!(merged.id, ann.id);
        assert_eq!(merged.name, "Ann Lee");
        assert_eq!(merged.phone.as_deref(), Some("+1 555-0100"));
        assert_eq!(merged.tags, parse_tags("work,friend"));
    }

    #[test]
    fn test_find_candidates_is_lazy_and_fresh() {
        let contacts = vec![contact("Jo"), contact("Jo"), contact("Jo")];
        let mut iter = find_candidates(&contacts, 0.85);
        assert!(iter.next().is_some());
        assert_eq!(find_candidates(&contacts, 0.85).count(), 3);
    }

    #[test]
    fn test_keep_a_resolves_email_conflict_and_unions_tags() {
        let mut a = contact("Ann Lee");
        a.email = Some("ann@work.example".into());
        a.tags = parse_tags("work");
        let mut b = contact("Ann Lee");
        b.email = Some("ann@home.example".into());
        b.tags = parse_tags("friend,family");
        b.favorite = true;

        let merged = merge_contacts(&a, &b, MergePolicy::KeepA, &mut NoPrompt);
        assert_eq!(merged.email.as_deref(), Some("ann@work.example"));
        assert_eq!(merged.tags, parse_tags("work,friend,family"));
        assert!(merged.favorite);
    }

    #[test]
    fn test_keep_b_policy() {
        let mut a = contact("Ann");
        a.phone = Some("5550100111".into());
        let mut b = contact("Ann");
        b.phone = Some("5550100222".into());

        let merged = merge_contacts(&a, &b, MergePolicy::KeepB, &mut NoPrompt);
        assert_eq!(merged.phone.as_deref(), Some("5550100222"));
        assert_eq!(merged.id, a.id);
    }

    #[test]
    fn test_prompt_policy_asks_per_conflict() {
        let mut a = contact("Ann");
        a.phone = Some("5550100111".into());
        a.email = Some("a@example.com".into());
        let mut b = contact("Ann");
        b.phone = Some("5550100222".into());
        b.email = Some("b@example.com".into());

        let mut resolver = Scripted(vec![Side::B, Side::A], Vec::new());
        let merged = merge_contacts(&a, &b, MergePolicy::Prompt, &mut resolver);

        assert_eq!(resolver.1, vec![ConflictField::Phone, ConflictField::Email]);
        assert_eq!(merged.phone.as_deref(), Some("5550100222"));
        assert_eq!(merged.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_equal_values_do_not_conflict() {
        let mut a = contact("Ann");
        a.phone = Some("+1 555-0100".into());
        a.email = Some("Ann@Example.com".into());
        let mut b = contact("Ann");
        b.phone = Some("15550100".into());
        b.email = Some("ann@example.com".into());

        let mut resolver = Scripted(Vec::new(), Vec::new());
        let merged = merge_contacts(&a, &b, MergePolicy::Prompt, &mut resolver);
        assert!(resolver.1.is_empty());
        assert_eq!(merged.phone.as_deref(), Some("+1 555-0100"));
    }

    #[test]
    fn test_more_complete_name_wins() {
        let a = contact("Ann Lee");
        let b = contact("Ann B. Lee");

        let merged = merge_contacts(&a, &b, MergePolicy::KeepA, &mut NoPrompt);
        assert_eq!(merged.name, "Ann B. Lee");
        assert_eq!(merged.id, a.id);
    }

    #[test]
    fn test_lone_value_fills_gap() {
        let a = contact("Ann");
        let mut b = contact("Ann");
        b.email = Some("ann@example.com".into());

        let merged = merge_contacts(&a, &b, MergePolicy::KeepA, &mut NoPrompt);
        assert_eq!(merged.email.as_deref(), Some("ann@example.com"));
    }

    #[test]
    fn test_valid_value_beats_invalid() {
        let mut a = contact("Ann");
        a.phone = Some("12".into());
        let mut b = contact("Ann");
        b.phone = Some("5550100123".into());

        let merged = merge_contacts(&a, &b, MergePolicy::KeepA, &mut NoPrompt);
        assert_eq!(merged.phone.as_deref(), Some("5550100123"));
    }

    #[test]
    fn test_policy_serializes_kebab_case() {
        assert_eq!(serde_json::to_string(&MergePolicy::KeepB).unwrap(), "\"keep-b\"");
        assert_eq!(MergePolicy::Prompt.to_string(), "prompt");
    }
}
