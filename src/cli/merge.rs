//! Duplicate merge CLI command
//!
//! Walks the candidate pairs one at a time. Each pair is merged only after
//! the user confirms it (or `--yes` is given); a declined pair is not
//! proposed again in the same run.

use std::collections::HashSet;
use std::io::{self, BufRead, Write};

use clap::Args;

use crate::error::ContactResult;
use crate::models::{Contact, ContactId};
use crate::services::merge::{find_candidates, ConflictField, ConflictResolver, MergePolicy, Side};
use crate::session::Session;

/// Arguments for `merge`
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// How to settle differing phone/email values (defaults to the setting)
    #[arg(short, long, value_enum)]
    pub policy: Option<MergePolicy>,

    /// Merge every proposed pair without asking
    #[arg(short, long)]
    pub yes: bool,
}

/// Line-based prompts over any reader
pub struct Prompter<R> {
    input: R,
}

impl<R: BufRead> Prompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn read_answer(&mut self, question: &str) -> String {
        print!("{} ", question);
        let _ = io::stdout().flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(_) => line.trim().to_lowercase(),
            Err(_) => String::new(),
        }
    }

    /// Ask a yes/no question. Anything but `y`/`yes` is a no.
    pub fn confirm(&mut self, question: &str) -> bool {
        matches!(self.read_answer(&format!("{} [y/N]", question)).as_str(), "y" | "yes")
    }
}

impl<R: BufRead> ConflictResolver for Prompter<R> {
    fn resolve(&mut self, field: ConflictField, a: &str, b: &str) -> Side {
        println!("  Conflicting {}:", field);
        println!("    [a] {}", a);
        println!("    [b] {}", b);
        match self.read_answer("  Keep which? [A/b]").as_str() {
            "b" => Side::B,
            _ => Side::A,
        }
    }
}

fn describe(contact: &Contact) -> String {
    format!(
        "{} | {} | {} | {}",
        contact,
        contact.phone.as_deref().unwrap_or("-"),
        contact.email.as_deref().unwrap_or("-"),
        contact.tags_joined()
    )
}

/// Handle the merge command, reading answers from stdin
pub fn handle_merge_command(session: &mut Session, args: MergeArgs) -> ContactResult<()> {
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock());
    run_merge(session, &args, &mut prompter)
}

/// Propose and merge duplicates as one change to the contacts file
pub fn run_merge<R: BufRead>(
    session: &mut Session,
    args: &MergeArgs,
    prompter: &mut Prompter<R>,
) -> ContactResult<()> {
    let threshold = session.settings().merge.similarity_threshold;
    let policy = args.policy.unwrap_or(session.settings().merge.default_policy);

    if find_candidates(session.store().all(), threshold).next().is_none() {
        println!("No likely duplicates found.");
        return Ok(());
    }

    let merged = session.mutate("merge", |store| {
        let mut declined: HashSet<(ContactId, ContactId)> = HashSet::new();
        let mut merged = Vec::new();

        loop {
            let next = find_candidates(store.all(), threshold)
                .find(|pair| !declined.contains(&(pair.a.id, pair.b.id)))
                .map(|pair| (pair.a.clone(), pair.b.clone(), pair.score));
            let Some((a, b, score)) = next else {
                break;
            };

            println!();
            println!("Possible duplicate ({:.0}% similar):", score * 100.0);
            println!("  A: {}", describe(&a));
            println!("  B: {}", describe(&b));

            if !args.yes && !prompter.confirm("Merge B into A?") {
                declined.insert((a.id, b.id));
                continue;
            }

            let survivor = store.merge(a.id, b.id, policy, prompter)?;
            println!("  Merged into {}", survivor);
            merged.push(survivor);
        }

        Ok(merged)
    })?;

    println!();
    if merged.is_empty() {
        println!("No contacts merged.");
    } else {
        println!("Merged {} pair(s). Run 'contacts undo' to revert.", merged.len());
    }
    Ok(())
}
