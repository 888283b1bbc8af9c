//! Backup display formatting

use chrono::{Duration, NaiveDateTime};

use crate::backup::SnapshotInfo;

/// Format the daily backup list, newest first. Ages are relative to `now`.
pub fn format_backup_list(backups: &[SnapshotInfo], now: NaiveDateTime) -> String {
    if backups.is_empty() {
        return "No backups found.\nOne is taken automatically before the first change of each day."
            .to_string();
    }

    let mut output = String::new();
    output.push_str("Available Backups\n");
    output.push_str("=================\n");

    for (i, backup) in backups.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {}  {} ({} ago, {})\n",
            i + 1,
            backup.date(),
            backup.filename,
            format_duration(now.signed_duration_since(backup.created_at)),
            format_size(backup.size_bytes),
        ));
    }

    output.push_str(&format!("\nTotal: {} backup(s)", backups.len()));
    output
}

/// Format a duration in human-readable form
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
