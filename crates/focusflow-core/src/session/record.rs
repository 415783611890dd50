use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::TimerMode;

/// One work session. Created when a work phase begins (or is reconstructed
/// when it ends), completed exactly once, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    id: Uuid,
    start_time: DateTime<Utc>,
    #[serde(default)]
    end_time: Option<DateTime<Utc>>,
    mode_name: String,
    planned_duration_minutes: u32,
    #[serde(default)]
    actual_duration_minutes: u32,
    #[serde(default)]
    completed: bool,
}

impl SessionRecord {
    /// Start a session now.
    pub fn new(mode_name: impl Into<String>, planned_duration_minutes: u32) -> Self {
        Self::started_at(mode_name, planned_duration_minutes, Utc::now())
    }

    pub fn started_at(
        mode_name: impl Into<String>,
        planned_duration_minutes: u32,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time,
            end_time: None,
            mode_name: mode_name.into(),
            planned_duration_minutes,
            actual_duration_minutes: 0,
            completed: false,
        }
    }

    /// Start a session for the work phase of `mode`.
    pub fn for_mode(mode: &TimerMode, start_time: DateTime<Utc>) -> Self {
        Self::started_at(mode.name(), mode.work_minutes(), start_time)
    }

    /// Mark completed now.
    pub fn complete(&mut self) {
        self.complete_at(Utc::now());
    }

    /// Mark completed at `end_time`. Only the first call has any effect.
    pub fn complete_at(&mut self, end_time: DateTime<Utc>) {
        if self.completed {
            return;
        }
        let secs = (end_time - self.start_time).num_seconds().max(0);
        self.end_time = Some(end_time);
        self.actual_duration_minutes = u32::try_from(secs / 60).unwrap_or(u32::MAX);
        self.completed = true;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Calendar date of the start, in local time.
    pub fn start_date(&self) -> NaiveDate {
        self.start_time.with_timezone(&Local).date_naive()
    }

    pub fn mode_name(&self) -> &str {
        &self.mode_name
    }

    pub fn planned_duration_minutes(&self) -> u32 {
        self.planned_duration_minutes
    }

    pub fn actual_duration_minutes(&self) -> u32 {
        self.actual_duration_minutes
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Actual minutes if any were measured, else the planned minutes.
    pub fn duration_minutes(&self) -> u32 {
        if self.actual_duration_minutes > 0 {
            self.actual_duration_minutes
        } else {
            self.planned_duration_minutes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_record_is_incomplete() {
        let record = SessionRecord::new("Pomodoro", 25);
        assert!(!record.is_completed());
        assert!(record.end_time().is_none());
        assert_eq!(record.actual_duration_minutes(), 0);
        assert_eq!(record.duration_minutes(), 25);
    }

    #[test]
    fn complete_measures_whole_minutes() {
        let start = Utc::now() - Duration::seconds(26 * 60 + 59);
        let mut record = SessionRecord::started_at("Pomodoro", 25, start);
        let end = start + Duration::seconds(26 * 60 + 59);
        record.complete_at(end);
        assert!(record.is_completed());
        assert_eq!(record.end_time(), Some(end));
        assert_eq!(record.actual_duration_minutes(), 26);
        assert_eq!(record.duration_minutes(), 26);
    }

    #[test]
    fn sub_minute_session_falls_back_to_planned() {
        let mut record = SessionRecord::new("52/17", 52);
        record.complete();
        assert_eq!(record.actual_duration_minutes(), 0);
        assert_eq!(record.duration_minutes(), 52);
    }

    #[test]
    fn completion_happens_once() {
        let start = Utc::now();
        let mut record = SessionRecord::started_at("Pomodoro", 25, start);
        record.complete_at(start + Duration::minutes(25));
        record.complete_at(start + Duration::minutes(90));
        assert_eq!(record.actual_duration_minutes(), 25);
    }

    #[test]
    fn end_before_start_counts_as_zero() {
        let start = Utc::now();
        let mut record = SessionRecord::started_at("Pomodoro", 25, start);
        record.complete_at(start - Duration::minutes(5));
        assert_eq!(record.actual_duration_minutes(), 0);
        assert_eq!(record.duration_minutes(), 25);
    }

    #[test]
    fn for_mode_copies_name_and_plan() {
        let record = SessionRecord::for_mode(&TimerMode::Ultradian, Utc::now());
        assert_eq!(record.mode_name(), "Ultradian");
        assert_eq!(record.planned_duration_minutes(), 90);
    }
}
