use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::dispatcher::dispatch;
use crate::core::executor::ActionRequest;
use crate::core::ledger::Ledger;
use crate::errors::{AppError, AppResult};
use crate::models::action::Action;
use crate::ui::messages::{denied, success};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Act {
        user,
        action,
        channel,
        note,
        source,
        json,
    } = cmd
    {
        let parsed = Action::parse_any(action).ok_or_else(|| {
            AppError::InvalidAction(format!("'{}'. Use start, end, break or back.", action))
        })?;

        // the typed word is kept in the action log unless a note is given
        let annotation = note.as_deref().or(Some(action.as_str()));
        let req = ActionRequest::new(user, parsed)
            .channel(channel.as_deref())
            .annotation(annotation)
            .source(source);

        let mut ledger = Ledger::open(cfg)?;
        let outcome = dispatch(&mut ledger, &req)?;

        if *json {
            println!("{}", serde_json::to_string(&outcome)?);
        } else if outcome.allowed {
            success(format!(
                "{}: {} recorded, now {}",
                user,
                parsed.label(),
                outcome.status.label()
            ));
        } else {
            denied(outcome.message.as_deref().unwrap_or("Action not allowed."));
        }
    }

    Ok(())
}
