//! Transition validator: which action is legal from which status.
//!
//! | status   | permitted               | next          |
//! |----------|-------------------------|---------------|
//! | OFF      | START_WORK              | WORKING       |
//! | WORKING  | END_WORK, START_BREAK   | OFF, ON_BREAK |
//! | ON_BREAK | END_BREAK               | WORKING       |

use crate::models::action::Action;
use crate::models::status::Status;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Allowed { next: Status },
    Denied(Denial),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub status: Status,
    pub action: Action,
    /// The one action the user should record next.
    pub hint: Action,
    pub message: String,
}

/// Resulting status, or `None` when the action is illegal from `status`.
/// No wildcard arms: a new action or status must be placed in the table.
pub fn next_status(status: Status, action: Action) -> Option<Status> {
    use Action::*;
    use Status::*;

    match (status, action) {
        (Off, StartWork) => Some(Working),
        (Working, EndWork) => Some(Off),
        (Working, StartBreak) => Some(OnBreak),
        (OnBreak, EndBreak) => Some(Working),

        (Off, EndWork | StartBreak | EndBreak) => None,
        (Working, StartWork | EndBreak) => None,
        (OnBreak, StartWork | EndWork | StartBreak) => None,
    }
}

pub fn permitted(status: Status) -> Vec<Action> {
    Action::ALL
        .into_iter()
        .filter(|a| next_status(status, *a).is_some())
        .collect()
}

pub fn validate(status: Status, action: Action) -> Transition {
    match next_status(status, action) {
        Some(next) => Transition::Allowed { next },
        None => Transition::Denied(deny(status, action)),
    }
}

fn deny(status: Status, action: Action) -> Denial {
    let head = format!(
        "Current status is {} ({}): cannot {}.",
        status,
        status.label(),
        action.label()
    );

    let (hint, tail) = match status {
        Status::Off => (
            Action::StartWork,
            format!("Record \"{}\" first.", Action::StartWork.label()),
        ),
        Status::OnBreak => (
            Action::EndBreak,
            format!("Record \"{}\" first.", Action::EndBreak.label()),
        ),
        Status::Working if action == Action::StartWork => (
            Action::EndWork,
            format!(
                "Record \"{}\" before starting again.",
                Action::EndWork.label()
            ),
        ),
        Status::Working => (Action::StartBreak, "You are not on a break.".to_string()),
    };

    Denial {
        status,
        action,
        hint,
        message: format!("{} {}", head, tail),
    }
}
