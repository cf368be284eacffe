/// Utility functions for timestamps, addresses and log file naming
use std::path::{Path, PathBuf};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::error::Result;

const FIRST_SEEN_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

const FILE_STAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour][minute][second].[subsecond digits:9][offset_hour sign:mandatory][offset_minute]"
);

/// Format a first-seen timestamp as `YYYY-MM-DD HH:MM:SS`
///
/// Falls back to the default string representation if formatting fails.
pub fn format_first_seen(dt: &OffsetDateTime) -> String {
    dt.format(FIRST_SEEN_FORMAT)
        .unwrap_or_else(|_| dt.to_string())
}

/// Build `<root>/wigle-bluetooth-<start stamp>.csv` for a run started at `started_at`
pub fn log_file_path(root: &Path, started_at: OffsetDateTime) -> Result<PathBuf> {
    let stamp = started_at.format(FILE_STAMP_FORMAT)?;
    Ok(root.join(format!("wigle-bluetooth-{}.csv", stamp)))
}

/// Canonical device address: trimmed, upper-case hex, colon separated
pub fn canonical_address(raw: &str) -> String {
    raw.trim().replace('-', ":").to_uppercase()
}

/// Drop sub-second precision; first-seen times are tracked per second
pub fn truncate_to_second(dt: OffsetDateTime) -> OffsetDateTime {
    dt.replace_nanosecond(0).unwrap_or(dt)
}
