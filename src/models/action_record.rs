use super::action::Action;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Append-only audit row, one per accepted action (`attendance_records`).
#[derive(Debug, Clone, Serialize)]
pub struct ActionRecord {
    pub id: i64,
    pub user_key: String,
    pub channel_key: Option<String>,
    pub action: Action,
    pub timestamp: DateTime<Utc>,
    pub source_ref: String, // epoch millis of `timestamp`, like a chat message ts
    pub raw_message: String,
    pub source: String,
}
