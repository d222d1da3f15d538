use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::del::DeleteLogic;
use crate::db::initialize::ensure_schema;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use crate::utils::time::format_ts;

use std::io::{self, Write};

/// Ask a yes/no confirmation from the user
fn ask_confirmation(prompt: &str) -> bool {
    warning(prompt);
    print!("Confirm [y/N]: ");
    let _ = io::stdout().flush();

    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        matches!(s.trim().to_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Del { session, yes } = cmd {
        let mut pool = DbPool::new(&cfg.database)?;
        ensure_schema(&pool.conn)?;

        let target = DeleteLogic::preview(&pool, *session)?;
        let prompt = format!(
            "Delete work session #{} of {} started {}? This action is irreversible.",
            target.id,
            target.user_key,
            format_ts(&target.start)
        );

        if !*yes && !ask_confirmation(&prompt) {
            info("Operation cancelled.");
            return Ok(());
        }

        DeleteLogic::apply(&mut pool, *session)?;
        success(format!("Work session #{} has been deleted.", session));
    }

    Ok(())
}
