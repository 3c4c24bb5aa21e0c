//! Command-line time parsing

use chrono::{DateTime, Days, NaiveDate, Utc};

use super::CliError;

/// Try to parse an RFC3339 datetime
///
/// Handles both inputs with and without timezone designators:
/// - "2024-01-01T00:00:00Z" - explicit UTC
/// - "2024-01-01T00:00:00+01:00" - explicit offset
/// - "2024-01-01T00:00:00" - no timezone, assumed UTC
fn try_parse_datetime_rfc3339(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&format!("{input}Z")) {
        return Some(dt.with_timezone(&Utc));
    }

    None
}

fn parse_date(input: &str, what: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| CliError::InvalidArgument(format!("Invalid {what} time '{input}': {e}")))
}

/// Parse a range start from YYYY-MM-DD or RFC3339.
///
/// A bare date means the start of that day (00:00:00 UTC).
pub fn parse_start_time(input: &str) -> Result<DateTime<Utc>, CliError> {
    if let Some(dt) = try_parse_datetime_rfc3339(input) {
        return Ok(dt);
    }

    let datetime = parse_date(input, "start")?
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CliError::InvalidArgument(format!("Invalid start time '{input}'")))?;
    Ok(datetime.and_utc())
}

/// Parse a range end from YYYY-MM-DD or RFC3339.
///
/// Ranges are half-open, so a bare date means midnight at the start of the
/// following day and the named day is fully included.
pub fn parse_end_time(input: &str) -> Result<DateTime<Utc>, CliError> {
    if let Some(dt) = try_parse_datetime_rfc3339(input) {
        return Ok(dt);
    }

    let date = parse_date(input, "end")?;
    let datetime = date
        .checked_add_days(Days::new(1))
        .and_then(|next| next.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CliError::InvalidArgument(format!("Invalid end time '{input}'")))?;
    Ok(datetime.and_utc())
}
