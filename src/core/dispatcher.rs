//! Action dispatcher: the entry point event sources call.
//!
//! Denials come back as `Ok(ActionOutcome { allowed: false, .. })`; only
//! infrastructure and consistency failures are `Err`.

use crate::core::executor::ActionRequest;
use crate::core::ledger::Ledger;
use crate::errors::{AppError, AppResult};
use crate::models::action::Action;
use crate::models::outcome::ActionOutcome;
use tracing::{debug, info};

pub fn dispatch(ledger: &mut Ledger, req: &ActionRequest) -> AppResult<ActionOutcome> {
    let outcome = ledger.execute(req)?;

    if outcome.allowed {
        info!(
            user = req.user_key,
            action = %req.action,
            status = %outcome.status,
            source = req.source,
            "action recorded"
        );
    } else {
        debug!(
            user = req.user_key,
            action = %req.action,
            status = %outcome.status,
            "action denied"
        );
    }

    Ok(outcome)
}

/// Dispatch raw chat input: a command word, a button id or a canonical
/// action name. The input itself is kept as the annotation.
pub fn dispatch_text(
    ledger: &mut Ledger,
    user_key: &str,
    text: &str,
    channel_key: Option<&str>,
    source: &str,
) -> AppResult<ActionOutcome> {
    let action = Action::parse_any(text).ok_or_else(|| {
        AppError::InvalidAction(format!(
            "'{}'. Use start, end, break or back.",
            text.trim()
        ))
    })?;

    let req = ActionRequest::new(user_key, action)
        .channel(channel_key)
        .annotation(Some(text))
        .source(source);

    dispatch(ledger, &req)
}
