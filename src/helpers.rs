use super::error::ConversionError;
use chrono::{DateTime, SecondsFormat, Utc};

/// Number of 100ns ticks between 1601-01-01 and 1970-01-01
pub const UNIX_EPOCH_FILETIME: i64 = 0x019D_B1DE_D53E_8000;
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Converts a Windows filetime to seconds since the unix epoch
///
/// The division truncates towards zero, sub second ticks are dropped.
pub fn filetime_to_unix(file_time: i64) -> i64 {
    file_time.saturating_sub(UNIX_EPOCH_FILETIME) / TICKS_PER_SECOND
}

/// Parses the decimal filetime attribute value as printed by `adcli show-computer`
///
/// # Errors
/// Will `Err()` on anything but a (optionally signed) decimal integer
pub fn parse_filetime(value: &str) -> Result<i64, ConversionError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ConversionError::InvalidFiletime(value.to_string()))
}

/// Converts from a Windows filetime to a Datetime with second precision
pub fn filetime_to_datetime(file_time: i64) -> Result<DateTime<Utc>, ConversionError> {
    let unix = filetime_to_unix(file_time);
    DateTime::<Utc>::from_timestamp(unix, 0).ok_or(ConversionError::OutOfRange(unix))
}

/// ISO 8601 rendering used for `pwdLastSetDateTime`, e.g. `2012-12-14T23:06:40+00:00`
pub fn format_datetime(date_time: &DateTime<Utc>) -> String {
    date_time.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Formats an elapsed number of seconds as `D-HH:MM:SS`
///
/// Days are not padded. A negative age (timestamp in the future) keeps the
/// same layout with a leading `-`.
pub fn format_age(total_seconds: i64) -> String {
    let sign = if total_seconds < 0 { "-" } else { "" };
    let total = total_seconds.unsigned_abs();
    let days = total / 86_400;
    let hours = (total / 3_600) % 24;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    format!("{sign}{days}-{hours:02}:{minutes:02}:{seconds:02}")
}

/// A value counts as given if it is not empty after trimming
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Builds the ldap base dn of a dns domain, `example.org` becomes `dc=example,dc=org`
pub fn domain_to_basedn(domain: &str) -> String {
    format!("dc={}", domain.split('.').collect::<Vec<_>>().join(",dc="))
}

/// Wraps a value in single quotes the way the composed shell fragments expect
///
/// An embedded `'` closes the quoted string, is escaped and reopens it, so
/// `it's` becomes `'it'\''s'`.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
