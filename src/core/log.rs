use crate::db::log::load_log;
use crate::db::pool::DbPool;
use crate::db::queries::load_action_records;
use crate::errors::AppResult;
use crate::models::action::Action;
use ansi_term::Colour;

const OP_WIDTH_LIMIT: usize = 60;

/// ANSI colour for an internal log operation
fn color_for_operation(op: &str) -> Colour {
    match op {
        "init" => Colour::RGB(255, 153, 51), // orange
        "migration_applied" => Colour::Purple,
        "del" => Colour::Red,
        "vacuum" => Colour::Blue,
        _ => Colour::White,
    }
}

fn color_for_action(action: Action) -> Colour {
    match action {
        Action::StartWork => Colour::Green,
        Action::EndWork => Colour::Red,
        Action::StartBreak => Colour::Yellow,
        Action::EndBreak => Colour::Cyan,
    }
}

/// Cut to `limit` visible characters, ending with "..." when shortened.
fn truncate(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        return s.to_string();
    }
    let mut out: String = s.chars().take(limit.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

pub struct LogLogic;

impl LogLogic {
    /// Internal operations log: init, migrations, operator deletions.
    pub fn print_log(pool: &mut DbPool) -> AppResult<()> {
        let entries = load_log(&pool.conn)?;

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        // widths are computed on plain text, colour is applied afterwards
        let rows: Vec<(i64, String, String, String, String)> = entries
            .into_iter()
            .map(|e| {
                let op_target = if e.target.is_empty() {
                    e.operation.clone()
                } else {
                    truncate(&format!("{} ({})", e.operation, e.target), OP_WIDTH_LIMIT)
                };
                (e.id, e.date, e.operation, op_target, e.message)
            })
            .collect();

        let id_w = rows.iter().map(|r| r.0.to_string().len()).max().unwrap_or(1);
        let date_w = rows.iter().map(|r| r.1.len()).max().unwrap_or(10);
        let op_w = rows
            .iter()
            .map(|r| r.3.chars().count())
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH_LIMIT);

        println!("📜 Internal log:\n");

        for (id, date, operation, op_target, message) in rows {
            let color = color_for_operation(&operation);
            let padding = " ".repeat(op_w.saturating_sub(op_target.chars().count()));

            // only the operation word is coloured
            let colored = match op_target.split_once(' ') {
                Some((op, rest)) => format!("{} {}", color.paint(op), rest),
                None => color.paint(op_target.as_str()).to_string(),
            };

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                id,
                date,
                colored,
                padding,
                message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }

    /// Attendance action log, newest first.
    pub fn print_actions(pool: &mut DbPool, user_key: Option<&str>, limit: usize) -> AppResult<()> {
        let records = load_action_records(&pool.conn, user_key, limit)?;

        if records.is_empty() {
            println!("📜 No actions recorded.");
            return Ok(());
        }

        let user_w = records.iter().map(|r| r.user_key.len()).max().unwrap_or(4);
        let action_w = Action::ALL
            .iter()
            .map(|a| a.to_db_str().len())
            .max()
            .unwrap_or(11);

        println!("📜 Action log:\n");

        for r in records {
            let color = color_for_action(r.action);
            let padding = " ".repeat(action_w.saturating_sub(r.action.to_db_str().len()));

            println!(
                "{:>5}: {} | {:<user_w$} | {}{} | {:<8} | {}",
                r.id,
                crate::utils::time::format_ts(&r.timestamp),
                r.user_key,
                color.paint(r.action.to_db_str()),
                padding,
                r.source,
                truncate(&r.raw_message, OP_WIDTH_LIMIT),
                user_w = user_w
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
