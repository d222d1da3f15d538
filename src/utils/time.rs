//! Time utilities: timestamp (de)serialization for the ledger, durations, formatting minutes.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width UTC RFC 3339 with milliseconds, so TEXT ordering is chronological.
pub fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_ts(s: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::InvalidTimestamp(s.to_string()))
}

/// Same as [`parse_ts`] but shaped for `rusqlite` row mappers.
pub fn ts_from_sql(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    parse_ts(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Current instant truncated to the stored precision.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    // round-trip through the storage format so in-memory and stored values compare equal
    parse_ts(&format_ts(&now)).unwrap_or(now)
}

pub fn minutes_between(start: &DateTime<Utc>, end: &DateTime<Utc>) -> i64 {
    (*end - *start).num_minutes()
}

pub fn format_minutes(mins: i64) -> String {
    let sign = if mins < 0 { "-" } else { "" };
    let m = mins.abs();
    format!("{}{:02}:{:02}", sign, m / 60, m % 60)
}
