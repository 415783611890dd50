//! Minimal iCalendar (RFC 5545) codec for planner events.
//!
//! Only `VEVENT` blocks with `SUMMARY`, `DESCRIPTION`, `DTSTART` and
//! `DTEND` are understood. Times are floating local times; a trailing `Z`
//! is accepted and ignored.

use chrono::{NaiveDate, NaiveDateTime};

use super::PlannerEvent;
use crate::error::PlannerError;

const DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";

#[derive(Default)]
struct Draft {
    title: Option<String>,
    description: Option<String>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
}

/// Parse every `VEVENT`. Events missing a summary or start are dropped.
pub fn parse(text: &str) -> Result<Vec<PlannerEvent>, PlannerError> {
    let mut events = Vec::new();
    let mut draft: Option<Draft> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end();
        if line == "BEGIN:VEVENT" {
            draft = Some(Draft::default());
            continue;
        }
        if line == "END:VEVENT" {
            if let Some(Draft {
                title: Some(title),
                description,
                start: Some(start),
                end,
            }) = draft.take()
            {
                events.push(PlannerEvent::new(
                    title,
                    description.unwrap_or_default(),
                    start,
                    end,
                ));
            }
            continue;
        }
        let Some(current) = draft.as_mut() else {
            continue;
        };
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        // Strip parameters such as `DTSTART;TZID=Europe/Paris`.
        let name = name.split(';').next().unwrap_or(name);
        match name {
            "SUMMARY" => current.title = Some(unescape(value)),
            "DESCRIPTION" => current.description = Some(unescape(value)),
            "DTSTART" => current.start = Some(parse_time(value, line_no)?),
            "DTEND" => current.end = Some(parse_time(value, line_no)?),
            _ => {}
        }
    }

    Ok(events)
}

/// Serialize events as a `VCALENDAR` document.
pub fn write(events: &[PlannerEvent]) -> String {
    let mut out = String::from("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//FocusFlow//Study Planner//EN\n");
    for event in events {
        out.push_str("BEGIN:VEVENT\n");
        out.push_str(&format!("UID:{}\n", event.id));
        out.push_str(&format!("SUMMARY:{}\n", escape(&event.title)));
        if !event.description.is_empty() {
            out.push_str(&format!("DESCRIPTION:{}\n", escape(&event.description)));
        }
        out.push_str(&format!("DTSTART:{}\n", event.start.format(DATETIME_FORMAT)));
        if let Some(end) = event.end {
            out.push_str(&format!("DTEND:{}\n", end.format(DATETIME_FORMAT)));
        }
        out.push_str("END:VEVENT\n");
    }
    out.push_str("END:VCALENDAR\n");
    out
}

fn parse_time(value: &str, line: usize) -> Result<NaiveDateTime, PlannerError> {
    let value = value.trim().trim_end_matches('Z');
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, DATETIME_FORMAT) {
        return Ok(dt);
    }
    value
        .get(..8)
        .and_then(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| PlannerError::IcsParse {
            line,
            message: format!("unrecognised date-time '{value}'"),
        })
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_datetime_and_date_only_values() {
        let text = "BEGIN:VCALENDAR\r\n\
                    BEGIN:VEVENT\r\nSUMMARY:Exam\r\nDTSTART:20260610T090000Z\r\nDTEND:20260610T120000Z\r\nEND:VEVENT\r\n\
                    BEGIN:VEVENT\r\nSUMMARY:Holiday\r\nDTSTART;VALUE=DATE:20260611\r\nEND:VEVENT\r\n\
                    END:VCALENDAR\r\n";
        let events = parse(text).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Exam");
        assert_eq!(
            events[0].end.unwrap().format("%H:%M").to_string(),
            "12:00"
        );
        assert_eq!(events[1].start.format("%Y-%m-%d %H:%M").to_string(), "2026-06-11 00:00");
        assert!(events[1].end.is_none());
    }

    #[test]
    fn drops_events_without_summary_or_start() {
        let text = "BEGIN:VEVENT\nDTSTART:20260610T090000\nEND:VEVENT\n\
                    BEGIN:VEVENT\nSUMMARY:No start\nEND:VEVENT\n";
        assert!(parse(text).unwrap().is_empty());
    }

    #[test]
    fn ignores_properties_outside_events() {
        let text = "SUMMARY:Stray\nBEGIN:VEVENT\nSUMMARY:Real\nDTSTART:20260610T090000\nEND:VEVENT\n";
        let events = parse(text).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Real");
    }

    #[test]
    fn bad_timestamp_reports_line() {
        let text = "BEGIN:VEVENT\nSUMMARY:Broken\nDTSTART:tomorrow\nEND:VEVENT\n";
        match parse(text) {
            Err(PlannerError::IcsParse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn export_then_import_keeps_fields() {
        let start = NaiveDate::from_ymd_opt(2026, 6, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let event = PlannerEvent::new(
            "Read, annotate; repeat",
            "line one\nline two",
            start,
            Some(start + chrono::Duration::hours(1)),
        );
        let text = write(std::slice::from_ref(&event));
        assert!(text.starts_with("BEGIN:VCALENDAR\n"));
        assert!(text.contains(&format!("UID:{}\n", event.id)));
        assert!(text.contains("DTSTART:20260601T083000\n"));

        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title, event.title);
        assert_eq!(parsed[0].description, event.description);
        assert_eq!(parsed[0].start, event.start);
        assert_eq!(parsed[0].end, event.end);
    }
}
