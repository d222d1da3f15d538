use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::Ledger;
use crate::core::report::{DayReport, SessionReport, load_report};
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::utils::colors::{GREEN, GREY, RESET, YELLOW};
use crate::utils::table::{Column, Table};
use crate::utils::time::format_minutes;

fn hhmm(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%H:%M").to_string()
}

fn session_row(r: &SessionReport) -> Vec<String> {
    let end = match r.session.end {
        Some(end) => hhmm(&end),
        None => format!("{YELLOW}open{RESET}"),
    };
    let breaks = if r.breaks.is_empty() {
        format!("{GREY}--{RESET}")
    } else {
        r.breaks
            .iter()
            .map(|b| match b.end {
                Some(e) => format!("{}-{}", hhmm(&b.start), hhmm(&e)),
                None => format!("{}-…", hhmm(&b.start)),
            })
            .collect::<Vec<_>>()
            .join(" ")
    };

    vec![
        r.session.id.to_string(),
        r.session.user_key.clone(),
        hhmm(&r.session.start),
        end,
        breaks,
        format_minutes(r.break_minutes),
        format!("{GREEN}{}{RESET}", format_minutes(r.worked_minutes)),
    ]
}

fn print_day(day: &DayReport) {
    header(format!("{} (UTC)", day.date));

    let mut table = Table::new(vec![
        Column::new("ID"),
        Column::new("User"),
        Column::new("Start"),
        Column::new("End"),
        Column::new("Breaks"),
        Column::new("Break"),
        Column::new("Worked"),
    ]);
    for s in &day.sessions {
        table.add_row(session_row(s));
    }

    print!("{}", table.render());
    println!("Total worked: {}\n", format_minutes(day.total_minutes));
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { user, month, json } = cmd {
        let ledger = Ledger::open(cfg)?;
        let days = load_report(ledger.conn(), user.as_deref(), month.as_deref())?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&days)?);
            return Ok(());
        }

        if days.is_empty() {
            info("No work sessions found.");
            return Ok(());
        }

        for day in &days {
            print_day(day);
        }
    }

    Ok(())
}
