//! Object-key codec for the log storage service
//!
//! Log objects are stored under keys of the form
//! `<type>/YYYY/MM/DD/<type>_YYYYMMDD-HHMMSS-<suffix>.log.gz`. Everything up to
//! and including the `HHMMSS` field sorts lexicographically in the same order
//! as real time for a fixed `<type>`, so an encoded instant can be used
//! directly as a `marker`/`end_marker` bound in a range query.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use std::fmt;

/// Length of the `YYYYMMDD-HHMMSS` stamp embedded in a file name
const STAMP_LEN: usize = 15;

/// Log type namespace (e.g. `cds`, `cdi`)
///
/// # Examples
///
/// ```
/// use cdn_log_downloader::keys::LogType;
///
/// let log_type = LogType::parse("cds").unwrap();
/// assert_eq!(log_type.as_str(), "cds");
/// assert!(LogType::parse("cds/extra").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogType(String);

impl LogType {
    /// Parse and validate a log type
    ///
    /// Surrounding whitespace is trimmed. The value must be non-empty and may
    /// not contain `/` or inner whitespace, since it becomes a key segment.
    pub fn parse(s: &str) -> Result<Self, KeyError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(KeyError::InvalidLogType(
                "log type cannot be empty".to_string(),
            ));
        }
        if trimmed.contains('/') || trimmed.chars().any(char::is_whitespace) {
            return Err(KeyError::InvalidLogType(format!(
                "log type '{trimmed}' must not contain '/' or whitespace"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the raw type string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for LogType {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Encode an instant as the key prefix `<type>/YYYY/MM/DD/<type>_YYYYMMDD-HHMMSS`
///
/// All fields are zero-padded UTC. Sub-second precision is dropped, which also
/// folds a leap second onto `:59`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use cdn_log_downloader::keys::{encode, LogType};
///
/// let cds = LogType::parse("cds").unwrap();
/// let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 30).unwrap();
/// assert_eq!(encode(&cds, at), "cds/2024/01/01/cds_20240101-000030");
/// ```
pub fn encode(log_type: &LogType, instant: DateTime<Utc>) -> String {
    let instant = instant.with_nanosecond(0).unwrap_or(instant);
    format!(
        "{t}/{day}/{t}_{stamp}",
        t = log_type.as_str(),
        day = instant.format("%Y/%m/%d"),
        stamp = instant.format("%Y%m%d-%H%M%S"),
    )
}

/// Decode an object key (or encoded prefix) back into its type and creation instant
///
/// Anything after the `HHMMSS` field (suffix, extension) is ignored. The date
/// directories must agree with the stamp in the file name.
pub fn decode(key: &str) -> Result<(LogType, DateTime<Utc>), KeyError> {
    let parts: Vec<&str> = key.splitn(5, '/').collect();
    if parts.len() != 5 {
        return Err(KeyError::InvalidKey(format!(
            "expected <type>/YYYY/MM/DD/<file>, got '{key}'"
        )));
    }

    let log_type = LogType::parse(parts[0])?;
    let file = parts[4];
    let stamp = file
        .strip_prefix(log_type.as_str())
        .and_then(|rest| rest.strip_prefix('_'))
        .ok_or_else(|| {
            KeyError::InvalidKey(format!(
                "file name '{file}' does not start with '{log_type}_'"
            ))
        })?;

    let stamp = stamp.get(..STAMP_LEN).ok_or_else(|| {
        KeyError::InvalidKey(format!("file name '{file}' has a truncated timestamp"))
    })?;
    let naive = NaiveDateTime::parse_from_str(stamp, "%Y%m%d-%H%M%S")
        .map_err(|e| KeyError::InvalidKey(format!("invalid timestamp '{stamp}': {e}")))?;
    let instant = naive.and_utc();

    let expected_dirs = instant.format("%Y/%m/%d").to_string();
    let found_dirs = parts[1..4].join("/");
    if expected_dirs != found_dirs {
        return Err(KeyError::InvalidKey(format!(
            "date directories '{found_dirs}' disagree with file stamp '{stamp}'"
        )));
    }

    Ok((log_type, instant))
}

/// Errors produced by the key codec
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Log type failed validation
    #[error("invalid log type: {0}")]
    InvalidLogType(String),

    /// Object key could not be decoded
    #[error("invalid object key: {0}")]
    InvalidKey(String),
}
