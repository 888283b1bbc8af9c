//! Backup CLI commands
//!
//! Implements CLI commands for daily backups, restore and undo.

use chrono::Local;
use clap::Subcommand;

use crate::display::{format_backup_list, format_size};
use crate::error::ContactResult;
use crate::session::Session;

/// Backup subcommands
#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Take today's backup if there isn't one yet
    Backup,

    /// List all available backups
    Backups,

    /// Restore the contacts file from a daily backup
    Restore {
        /// Backup date (YYYY-MM-DD) or 'latest'
        date: String,
    },

    /// Revert the last change
    Undo,
}

impl BackupCommands {
    /// Operation name used in the error log
    pub fn name(&self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::Backups => "backups",
            Self::Restore { .. } => "restore",
            Self::Undo => "undo",
        }
    }

    /// Commands that must still run when the contacts file is corrupt
    pub fn repairs_primary(&self) -> bool {
        matches!(self, Self::Backups | Self::Restore { .. } | Self::Undo)
    }
}

/// Handle a backup command
pub fn handle_backup_command(session: &mut Session, cmd: BackupCommands) -> ContactResult<()> {
    if let Some(err) = session.primary_error() {
        session.record_error(cmd.name(), err);
        eprintln!("Warning: {}", err);
        eprintln!("Use 'contacts restore <date>' or 'contacts undo' to recover.");
    }

    match cmd {
        BackupCommands::Backup => match session.ensure_daily_backup()? {
            Some(info) => {
                println!("Backup created: {}", info.filename);
                println!("Location: {}", info.path.display());
                println!("Size: {}", format_size(info.size_bytes));
            }
            None => {
                println!("Today's backup already exists.");
                println!("Run 'contacts backups' to list them.");
            }
        },

        BackupCommands::Backups => {
            let backups = session.backups().list_backups()?;
            println!(
                "{}",
                format_backup_list(&backups, Local::now().naive_local())
            );
        }

        BackupCommands::Restore { date } => {
            let date = session.backups().resolve_date(&date)?;
            let info = session.restore(date)?;

            println!("Restore complete!");
            println!("  From:     {}", info.filename);
            println!("  Contacts: {}", session.store().len());
            println!("Run 'contacts undo' to go back to the state before the restore.");
        }

        BackupCommands::Undo => {
            let info = session.undo()?;
            println!(
                "Undo successful: contacts restored to {}.",
                info.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!("  Contacts: {}", session.store().len());
        }
    }

    Ok(())
}
