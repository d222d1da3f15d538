use super::status::Status;
use serde::Serialize;

/// What the dispatcher hands back to an event source.
///
/// Accepted: `{"allowed":true,"status":"WORKING"}` (status after the action).
/// Denied: `{"allowed":false,"status":"ON_BREAK","message":"..."}` (status
/// that caused the denial).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActionOutcome {
    pub allowed: bool,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionOutcome {
    pub fn accepted(status: Status) -> Self {
        Self {
            allowed: true,
            status,
            message: None,
        }
    }

    pub fn denied(status: Status, message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            status,
            message: Some(message.into()),
        }
    }
}
