use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::Subcommand;
use focusflow_core::{FocusFlow, PlannerEvent, TimerMode};
use uuid::Uuid;

use super::{parse_date, parse_datetime};

#[derive(Subcommand)]
pub enum PlannerAction {
    /// Add an event
    Add {
        /// Event title
        title: String,
        /// Start, "YYYY-MM-DD HH:MM"
        #[arg(long, value_parser = parse_datetime)]
        start: NaiveDateTime,
        /// End, "YYYY-MM-DD HH:MM"; open-ended if omitted
        #[arg(long, value_parser = parse_datetime)]
        end: Option<NaiveDateTime>,
        #[arg(long, default_value = "")]
        description: String,
        /// Mark as a study block run with this timer mode
        #[arg(long)]
        study_mode: Option<String>,
    },
    /// List events
    List {
        /// Only events starting on this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an event by ID
    Remove { id: Uuid },
    /// Import events from an .ics file
    Import { file: PathBuf },
    /// Export all events as iCalendar; stdout unless a file is given
    Export { file: Option<PathBuf> },
}

pub fn run(action: PlannerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = FocusFlow::open()?;

    match action {
        PlannerAction::Add {
            title,
            start,
            end,
            description,
            study_mode,
        } => {
            let planner = app.planner_mut();
            let event = match study_mode {
                Some(mode) => {
                    let mode = if mode.eq_ignore_ascii_case("custom") {
                        "Custom"
                    } else {
                        TimerMode::preset(&mode)?.name()
                    };
                    planner.add_study_event(title, description, start, end, mode)?
                }
                None => planner.add_event(title, description, start, end)?,
            };
            println!("Event added: {}", event.id);
        }
        PlannerAction::List { date, json } => {
            let planner = app.planner();
            let events: Vec<&PlannerEvent> = match date {
                Some(date) => planner.events_for_date(date),
                None => planner.events().iter().collect(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
                return Ok(());
            }
            if events.is_empty() {
                println!("No events.");
            }
            for event in events {
                let end = event
                    .end
                    .map(|e| e.format("%H:%M").to_string())
                    .unwrap_or_else(|| "--:--".into());
                let study = event
                    .timer_mode
                    .as_deref()
                    .map(|m| format!(" [{m}]"))
                    .unwrap_or_default();
                println!(
                    "{} {}-{}  {}{}  {}",
                    event.start.format("%Y-%m-%d"),
                    event.start.format("%H:%M"),
                    end,
                    event.title,
                    study,
                    event.id
                );
            }
        }
        PlannerAction::Remove { id } => {
            if !app.planner_mut().remove_event(id) {
                return Err(format!("no event with id {id}").into());
            }
            println!("Event removed: {id}");
        }
        PlannerAction::Import { file } => {
            let text = std::fs::read_to_string(&file)?;
            let (added, skipped) = app.planner_mut().import_ics(&text)?;
            println!("Imported {added} event(s), skipped {skipped}");
        }
        PlannerAction::Export { file } => {
            let ics = app.planner().export_ics();
            match file {
                Some(path) => {
                    std::fs::write(&path, ics)?;
                    println!("Exported to {}", path.display());
                }
                None => print!("{ics}"),
            }
        }
    }
    Ok(())
}
