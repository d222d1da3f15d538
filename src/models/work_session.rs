use chrono::{DateTime, Utc};
use serde::Serialize;

/// One continuous work interval, `end == None` while in progress.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WorkSession {
    pub id: i64,
    pub user_key: String,                // ⇔ work_sessions.user_key
    pub channel_key: Option<String>,     // ⇔ work_sessions.channel_key
    pub start: DateTime<Utc>,            // ⇔ work_sessions.start_time
    pub end: Option<DateTime<Utc>>,      // ⇔ work_sessions.end_time (NULL = open)
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkSession {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}
