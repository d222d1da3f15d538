use chrono::{DateTime, Utc};
use serde::Serialize;

/// A pause nested in exactly one work session.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Break {
    pub id: i64,
    pub work_session_id: i64,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Break {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Closed length in minutes; open breaks and skewed ones (end before
    /// start) count as zero.
    pub fn minutes(&self) -> i64 {
        match self.end {
            Some(end) => crate::utils::time::minutes_between(&self.start, &end).max(0),
            None => 0,
        }
    }
}
