//! Import and export CLI commands
//!
//! JSON and vCard export, CSV and JSON bulk import.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::error::{ContactError, ContactResult};
use crate::export::{self, DEFAULT_JSON_FILE};
use crate::services::import::{self, ImportReport, RowResult};
use crate::services::ContactFilter;
use crate::session::Session;

/// Import/export subcommands
#[derive(Subcommand, Debug)]
pub enum TransferCommands {
    /// Export contacts to a JSON file
    ExportJson {
        /// Only favorites
        #[arg(long)]
        favorites: bool,
        /// Only contacts with this tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Output file path
        #[arg(short, long, default_value = DEFAULT_JSON_FILE)]
        output: PathBuf,
    },

    /// Export one contact as a vCard file
    ExportVcard {
        /// Contact ID
        id: String,
        /// Directory to write the .vcf file into
        #[arg(short = 'd', long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Import contacts from a CSV file with a header row
    ImportCsv {
        /// Path to CSV file
        path: PathBuf,
    },

    /// Import contacts from a JSON array
    ImportJson {
        /// Path to JSON file
        path: PathBuf,
        /// Replace all existing contacts instead of appending
        #[arg(long)]
        replace: bool,
    },
}

impl TransferCommands {
    /// Operation name used in the error log
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExportJson { .. } => "export-json",
            Self::ExportVcard { .. } => "export-vcard",
            Self::ImportCsv { .. } => "import-csv",
            Self::ImportJson { .. } => "import-json",
        }
    }
}

/// Handle an import/export command
pub fn handle_transfer_command(session: &mut Session, cmd: TransferCommands) -> ContactResult<()> {
    let operation = cmd.name();

    match cmd {
        TransferCommands::ExportJson {
            favorites,
            tag,
            output,
        } => {
            let filter = ContactFilter {
                favorites_only: favorites,
                tag,
            };
            let contacts = filter.apply(session.store().all());
            export::export_json_file(&contacts, &output)?;

            println!(
                "Exported {} contact(s) to {}",
                contacts.len(),
                output.display()
            );
        }

        TransferCommands::ExportVcard { id, output_dir } => {
            let id = session.store().resolve(&id)?;
            let contact = session.store().get_required(id)?;
            let path = export::export_vcard(contact, &output_dir)?;

            println!("Exported vCard to {}", path.display());
        }

        TransferCommands::ImportCsv { path } => {
            let rows = import::parse_csv(open_source(&path)?)?;
            let report = session.mutate(operation, |store| import::import_rows(store, rows))?;
            print_report(session, operation, &report);
        }

        TransferCommands::ImportJson { path, replace } => {
            let rows: Vec<RowResult> = import::parse_json(open_source(&path)?)?;
            let report = session.mutate(operation, |store| {
                if replace {
                    import::replace_with_rows(store, rows)
                } else {
                    import::import_rows(store, rows)
                }
            })?;
            print_report(session, operation, &report);
        }
    }

    Ok(())
}

fn open_source(path: &Path) -> ContactResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| ContactError::Import(format!("Failed to open {}: {}", path.display(), e)))
}

/// Log each failed row and print the summary
fn print_report(session: &Session, operation: &str, report: &ImportReport) {
    for failure in &report.failures {
        session.record_error(operation, failure);
    }

    println!("Import Complete!");
    println!("================");
    println!("  Imported:    {}", report.imported.len());
    println!("  Skipped:     {}", report.failures.len());
    println!("  Total:       {}", session.store().len());

    if !report.failures.is_empty() {
        println!();
        println!("Skipped rows (also written to {}):", session.errors().path().display());
        for failure in &report.failures {
            println!("  {}", failure);
        }
    }
}
