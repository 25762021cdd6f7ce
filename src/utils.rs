//! Shared helpers for paths, timestamps and slugs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Gets the cross-platform default database path.
///
/// Returns the path as `{data_dir}/revkit/content.db` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn get_database_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("revkit").join("content.db"))
}

/// Ensures the parent directory of the database file exists.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }
    Ok(())
}

/// Parses a stored timestamp.
///
/// Accepts RFC 3339 as well as PostgreSQL's text rendering of `timestamptz`
/// (`2024-03-01 10:00:00.123+00`), which is what SQL dumps of the hosted
/// database contain. Values without an offset (`timestamp` columns, SQLite's
/// `datetime('now')`) are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }

    let mut candidate = raw.replacen(' ', "T", 1);
    // "+00" / "-05" offsets lack minutes
    let bytes = candidate.as_bytes();
    if bytes.len() > 3 {
        let sign = bytes[bytes.len() - 3];
        if (sign == b'+' || sign == b'-') && candidate[candidate.len() - 2..].bytes().all(|b| b.is_ascii_digit()) {
            candidate.push_str(":00");
        }
    }
    if let Ok(ts) = OffsetDateTime::parse(&candidate, &Rfc3339) {
        return Some(ts);
    }

    let naive = if candidate.contains('.') {
        PrimitiveDateTime::parse(
            &candidate,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        )
    } else {
        PrimitiveDateTime::parse(
            &candidate,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    };
    naive.ok().map(PrimitiveDateTime::assume_utc)
}


/// Formats a timestamp as RFC 3339 for storage.
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339)
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

/// Lower-case, hyphen-separated slug of a display name.
///
/// # Examples
///
/// ```
/// use revkit::utils::slugify;
///
/// assert_eq!(slugify("Cell Structure & Function"), "cell-structure-function");
/// assert_eq!(slugify("  Osmosis  "), "osmosis");
/// ```
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Truncates text to at most `max` characters for single-line display.
pub fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn get_database_path_returns_valid_path() {
        let path = get_database_path();
        assert!(path.is_ok());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("revkit"));
        assert!(path.to_string_lossy().contains("content.db"));
    }

    #[test]
    fn parses_rfc3339() {
        assert_eq!(
            parse_timestamp("2024-03-01T10:00:00Z"),
            Some(datetime!(2024-03-01 10:00 UTC))
        );
    }

    #[test]
    fn parses_postgres_text_timestamps() {
        assert_eq!(
            parse_timestamp("2024-03-01 10:00:00+00"),
            Some(datetime!(2024-03-01 10:00 UTC))
        );
        assert_eq!(
            parse_timestamp("2024-03-01 10:00:00.5+00:00"),
            Some(datetime!(2024-03-01 10:00:00.5 UTC))
        );
    }

    #[test]
    fn offsetless_timestamps_are_utc() {
        assert_eq!(
            parse_timestamp("2024-03-01 10:00:00"),
            Some(datetime!(2024-03-01 10:00 UTC))
        );
        assert_eq!(
            parse_timestamp("2024-03-01T10:00:00.250"),
            Some(datetime!(2024-03-01 10:00:00.25 UTC))
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn format_round_trips_through_parse() {
        let ts = datetime!(2023-11-05 08:30:15 UTC);
        assert_eq!(parse_timestamp(&format_timestamp(ts)), Some(ts));
    }

    #[test]
    fn preview_flattens_and_truncates() {
        assert_eq!(preview("a\n b", 10), "a b");
        assert_eq!(preview("abcdefghij", 4), "abcd...");
    }
}
