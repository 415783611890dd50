use chrono::{Duration, Local, NaiveDate, Utc};
use clap::Subcommand;
use focusflow_core::{FocusFlow, SessionRecord, TimerMode, ValidationError};

use super::parse_date;

#[derive(Subcommand)]
pub enum SessionsAction {
    /// List logged sessions, newest last
    List {
        /// Only sessions started on or after this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Only sessions started on or before this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        /// Only sessions of this mode (case-insensitive)
        #[arg(long)]
        mode: Option<String>,
        /// Skip this many matching sessions
        #[arg(long, default_value = "0")]
        offset: usize,
        /// Show at most this many sessions
        #[arg(long)]
        limit: Option<usize>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a finished session that was not timed here
    Log {
        /// Mode name ("Pomodoro", "52/17", "Ultradian" or "Custom")
        #[arg(long)]
        mode: String,
        /// Minutes spent
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        minutes: u32,
    },
}

pub fn run(action: SessionsAction) -> Result<(), Box<dyn std::error::Error>> {
    let app = FocusFlow::open()?;
    let mut ledger = app.ledger();

    match action {
        SessionsAction::List {
            from,
            to,
            mode,
            offset,
            limit,
            json,
        } => {
            ledger.filter_by_date_range(from, to);
            if let Some(mode) = mode {
                ledger.filter_by_mode(mode);
            }
            let page = ledger.page(offset, limit.unwrap_or(usize::MAX));

            if json {
                println!("{}", serde_json::to_string_pretty(page)?);
                return Ok(());
            }
            if page.is_empty() {
                println!("No sessions.");
                return Ok(());
            }
            println!("{:<17} {:<10} {:>7} {:>8}  ID", "Started", "Mode", "Minutes", "Status");
            for session in page {
                println!(
                    "{:<17} {:<10} {:>7} {:>8}  {}",
                    session.start_time().with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    session.mode_name(),
                    session.duration_minutes(),
                    if session.is_completed() { "done" } else { "open" },
                    session.id()
                );
            }
        }
        SessionsAction::Log { mode, minutes } => {
            let mode_name = canonical_mode_name(&mode)?;
            let end = Utc::now();
            let mut record = SessionRecord::started_at(
                mode_name,
                minutes,
                end - Duration::minutes(i64::from(minutes)),
            );
            record.complete_at(end);
            let id = record.id();
            ledger.log_session(record);
            println!("Session logged: {id}");
        }
    }
    Ok(())
}

fn canonical_mode_name(name: &str) -> Result<&'static str, ValidationError> {
    if name.trim().eq_ignore_ascii_case("custom") {
        return Ok("Custom");
    }
    TimerMode::preset(name).map(|m| m.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_names_are_normalised() {
        assert_eq!(canonical_mode_name("pomodoro").unwrap(), "Pomodoro");
        assert_eq!(canonical_mode_name(" CUSTOM ").unwrap(), "Custom");
        assert!(canonical_mode_name("nap").is_err());
    }
}
