use serde::Serialize;
use std::fmt;

/// Derived attendance status. Never stored.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Off,
    Working,
    OnBreak,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Off => "OFF",
            Status::Working => "WORKING",
            Status::OnBreak => "ON_BREAK",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Off => "off",
            Status::Working => "working",
            Status::OnBreak => "on break",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
