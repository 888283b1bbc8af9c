use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use contact_book::cli::{
    handle_backup_command, handle_contact_command, handle_merge_command, handle_transfer_command,
    BackupCommands, ContactCommands, MergeArgs, TransferCommands,
};
use contact_book::config::paths::DATA_DIR_ENV;
use contact_book::config::ContactPaths;
use contact_book::error::ContactResult;
use contact_book::log::ErrorLog;
use contact_book::session::Session;

#[derive(Parser)]
#[command(
    name = "contacts",
    version,
    about = "Terminal contact book",
    long_about = "A contact book that keeps everything in one CSV file. \
                  Supports tags, favorites, regex search, JSON/vCard export, \
                  bulk import, daily backups, undo and duplicate merging."
)]
struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Contact(ContactCommands),

    #[command(flatten)]
    Transfer(TransferCommands),

    #[command(flatten)]
    Backup(BackupCommands),

    /// Find and merge likely duplicate contacts
    Merge(MergeArgs),

    /// Show current configuration and paths
    Config,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Contact(cmd) => cmd.name(),
            Self::Transfer(cmd) => cmd.name(),
            Self::Backup(cmd) => cmd.name(),
            Self::Merge(_) => "merge",
            Self::Config => "config",
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(dir) => ContactPaths::with_base_dir(dir),
        None => ContactPaths::new().context("Could not determine the data directory")?,
    };

    let operation = cli.command.name();
    match run(paths.clone(), cli.command) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            ErrorLog::new(paths.error_log()).record(operation, &err);
            eprintln!("Error: {}", err);
            Ok(ExitCode::from(err.exit_code()))
        }
    }
}

fn run(paths: ContactPaths, command: Commands) -> ContactResult<()> {
    let mut session = match &command {
        Commands::Backup(cmd) if cmd.repairs_primary() => Session::open_for_recovery(paths)?,
        _ => Session::open(paths)?,
    };

    match command {
        Commands::Contact(cmd) => handle_contact_command(&mut session, cmd),
        Commands::Transfer(cmd) => handle_transfer_command(&mut session, cmd),
        Commands::Backup(cmd) => handle_backup_command(&mut session, cmd),
        Commands::Merge(args) => handle_merge_command(&mut session, args),
        Commands::Config => {
            let paths = session.paths();
            let settings = session.settings();
            if !paths.settings_file().exists() {
                settings.save(paths)?;
            }

            println!("Contact Book Configuration");
            println!("==========================");
            println!("Data directory:     {}", paths.base_dir().display());
            println!("Contacts file:      {}", paths.contacts_file().display());
            println!("Snapshot directory: {}", paths.snapshot_dir().display());
            println!("Error log:          {}", paths.error_log().display());
            println!("Settings file:      {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!(
                "  Daily backups kept:   {}",
                settings.backup_retention.daily_count
            );
            println!(
                "  Merge threshold:      {:.2}",
                settings.merge.similarity_threshold
            );
            println!("  Merge policy:         {}", settings.merge.default_policy);
            Ok(())
        }
    }
}
