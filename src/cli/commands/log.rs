use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::db::initialize::ensure_schema;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log {
        print,
        actions,
        user,
        limit,
    } = cmd
    {
        let mut pool = DbPool::new(&cfg.database)?;
        ensure_schema(&pool.conn)?;

        if *print {
            LogLogic::print_log(&mut pool)?;
        }
        if *actions {
            if *print {
                println!();
            }
            LogLogic::print_actions(&mut pool, user.as_deref(), *limit)?;
        }
        if !*print && !*actions {
            info("Nothing to show: use --print or --actions.");
        }
    }

    Ok(())
}
