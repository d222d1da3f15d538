use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::Ledger;
use crate::core::transition::permitted;
use crate::errors::AppResult;
use serde_json::json;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Status { user, json } = cmd {
        let ledger = Ledger::open(cfg)?;
        let status = ledger.status(user)?;
        let next = permitted(status);

        if *json {
            let actions: Vec<&str> = next.iter().map(|a| a.to_db_str()).collect();
            println!(
                "{}",
                json!({ "user": user, "status": status, "permitted": actions })
            );
        } else {
            let labels: Vec<&str> = next.iter().map(|a| a.label()).collect();
            println!("👤 {}: {} ({})", user, status, status.label());
            println!("   next: {}", labels.join(", "));
        }
    }

    Ok(())
}
