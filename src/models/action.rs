use serde::Serialize;
use std::fmt;

/// The four user-triggered transitions. Closed set.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    StartWork,
    EndWork,
    StartBreak,
    EndBreak,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::StartWork,
        Action::EndWork,
        Action::StartBreak,
        Action::EndBreak,
    ];

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Action::StartWork => "START_WORK",
            Action::EndWork => "END_WORK",
            Action::StartBreak => "START_BREAK",
            Action::EndBreak => "END_BREAK",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "START_WORK" => Some(Action::StartWork),
            "END_WORK" => Some(Action::EndWork),
            "START_BREAK" => Some(Action::StartBreak),
            "END_BREAK" => Some(Action::EndBreak),
            _ => None,
        }
    }

    /// Slash-command vocabulary (`/kintai start`, `/kintai 休憩`, ...).
    pub fn from_command_text(s: &str) -> Option<Self> {
        match s.trim() {
            "start" | "開始" | "業務開始" => Some(Action::StartWork),
            "end" | "終了" | "業務終了" => Some(Action::EndWork),
            "break" | "休憩" | "休憩開始" => Some(Action::StartBreak),
            "back" | "戻る" | "休憩終了" => Some(Action::EndBreak),
            _ => None,
        }
    }

    /// Interactive button ids.
    pub fn from_action_id(s: &str) -> Option<Self> {
        match s {
            "work_start" => Some(Action::StartWork),
            "work_end" => Some(Action::EndWork),
            "break_start" => Some(Action::StartBreak),
            "break_end" => Some(Action::EndBreak),
            _ => None,
        }
    }

    /// Accepts canonical names (any case), command words and button ids.
    pub fn parse_any(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        Self::from_db_str(&trimmed.to_uppercase().replace('-', "_"))
            .or_else(|| Self::from_command_text(trimmed))
            .or_else(|| Self::from_action_id(trimmed))
    }

    /// Human readable label used in outcome messages.
    pub fn label(&self) -> &'static str {
        match self {
            Action::StartWork => "start work",
            Action::EndWork => "end work",
            Action::StartBreak => "start break",
            Action::EndBreak => "end break",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}
