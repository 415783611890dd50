//! Study planner: calendar events with overlap rejection, persisted
//! through the same [`Store`] as the session ledger.

pub mod ics;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PlannerError, ValidationError};
use crate::storage::{load_records, save_records, Store, PLANNER_COLLECTION};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerEvent {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start: NaiveDateTime,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    #[serde(default)]
    pub study_block: bool,
    /// Name of the timer mode to use for a study block.
    #[serde(default)]
    pub timer_mode: Option<String>,
}

impl PlannerEvent {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            start,
            end,
            study_block: false,
            timer_mode: None,
        }
    }

    /// Events without an end never conflict.
    fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        match self.end {
            Some(existing_end) => start < existing_end && end > self.start,
            None => false,
        }
    }
}

pub struct Planner {
    events: Vec<PlannerEvent>,
    store: Box<dyn Store>,
    load_failed: bool,
}

impl Planner {
    /// Open over `store`; unreadable data yields an empty planner.
    pub fn open(store: Box<dyn Store>) -> Self {
        let (events, load_failed) = match load_records(store.as_ref(), PLANNER_COLLECTION) {
            Ok(events) => (events, false),
            Err(e) => {
                tracing::warn!(error = %e, "could not load planner events, starting empty");
                (Vec::new(), true)
            }
        };
        Self {
            events,
            store,
            load_failed,
        }
    }

    pub fn events(&self) -> &[PlannerEvent] {
        &self.events
    }

    pub fn events_for_date(&self, date: NaiveDate) -> Vec<&PlannerEvent> {
        self.events
            .iter()
            .filter(|e| e.start.date() == date)
            .collect()
    }

    /// Whether `[start, end)` overlaps any existing event. An open-ended
    /// request never conflicts.
    pub fn has_conflict(&self, start: NaiveDateTime, end: Option<NaiveDateTime>) -> bool {
        match end {
            Some(end) => self.events.iter().any(|e| e.overlaps(start, end)),
            None => false,
        }
    }

    pub fn add_event(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> Result<&PlannerEvent, PlannerError> {
        self.insert(PlannerEvent::new(title, description, start, end))
    }

    /// Add an event flagged as a study block bound to a timer mode.
    pub fn add_study_event(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        mode_name: impl Into<String>,
    ) -> Result<&PlannerEvent, PlannerError> {
        let mut event = PlannerEvent::new(title, description, start, end);
        event.study_block = true;
        event.timer_mode = Some(mode_name.into());
        self.insert(event)
    }

    pub fn remove_event(&mut self, id: Uuid) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        let removed = self.events.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.persist();
    }

    /// Add every event from ICS text. Returns `(added, skipped)` where
    /// skipped events conflicted with existing ones or had an end not after
    /// their start. Only a malformed document is an error, and then nothing
    /// is added.
    pub fn import_ics(&mut self, text: &str) -> Result<(usize, usize), PlannerError> {
        let parsed = ics::parse(text)?;
        let (mut added, mut skipped) = (0, 0);
        for event in parsed {
            let title = event.title.clone();
            match self.insert(event) {
                Ok(_) => added += 1,
                Err(e) => {
                    tracing::debug!(%title, error = %e, "skipping imported event");
                    skipped += 1;
                }
            }
        }
        Ok((added, skipped))
    }

    pub fn export_ics(&self) -> String {
        ics::write(&self.events)
    }

    fn insert(&mut self, event: PlannerEvent) -> Result<&PlannerEvent, PlannerError> {
        if let Some(end) = event.end {
            if end <= event.start {
                return Err(ValidationError::InvalidTimeRange {
                    start: event.start,
                    end,
                }
                .into());
            }
        }
        if self.has_conflict(event.start, event.end) {
            return Err(PlannerError::Conflict { title: event.title });
        }
        self.events.push(event);
        self.persist();
        Ok(&self.events[self.events.len() - 1])
    }

    fn persist(&mut self) {
        if self.load_failed {
            if let Err(e) = self.store.quarantine(PLANNER_COLLECTION) {
                tracing::warn!(error = %e, "unreadable planner events could not be moved aside, not saving");
                return;
            }
            self.load_failed = false;
        }
        if let Err(e) = save_records(self.store.as_ref(), PLANNER_COLLECTION, &self.events) {
            tracing::warn!(error = %e, "failed to persist planner events");
        }
    }
}
