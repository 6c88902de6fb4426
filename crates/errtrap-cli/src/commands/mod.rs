pub mod clear;
pub mod dataloader;
pub mod deployment;
pub mod diagnose;
pub mod export;
pub mod import;
pub mod log;
pub mod sourcemap;
pub mod tail;

use anyhow::{Context, Result};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Parses a point in time given on the command line: a full RFC 3339
/// timestamp, or a plain date taken as midnight UTC.
pub(crate) fn parse_point_in_time(value: &str) -> Result<OffsetDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(parsed);
    }
    let date = Date::parse(value, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date or timestamp: {value} (use RFC 3339 or YYYY-MM-DD)"))?;
    Ok(date.midnight().assume_utc())
}
