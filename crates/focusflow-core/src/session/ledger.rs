//! Append-only session ledger with a derived, filtered view.
//!
//! The filtered view is never edited directly: every filter change and
//! every append regenerates it from `(sessions, filter)`.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::record::SessionRecord;
use crate::bus::{EventBus, Subscriber, SubscriberId};
use crate::events::Event;
use crate::storage::{
    load_records, quarantined_name, save_records, Store, SESSIONS_COLLECTION,
};

/// Active filter parameters. Each part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Exact, case-insensitive match on the mode name.
    pub mode: Option<String>,
}

impl SessionFilter {
    pub fn matches(&self, session: &SessionRecord) -> bool {
        let date = session.start_date();
        if self.start_date.is_some_and(|start| date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }
        match &self.mode {
            Some(mode) => session.mode_name().to_lowercase() == mode.to_lowercase(),
            None => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.mode.is_none()
    }
}

pub struct SessionLedger {
    sessions: Vec<SessionRecord>,
    filtered: Vec<SessionRecord>,
    filter: SessionFilter,
    store: Box<dyn Store>,
    /// Stored history could not be read; it must be moved aside before
    /// the first save.
    load_failed: bool,
    bus: EventBus,
}

impl SessionLedger {
    /// Open the ledger over `store`, loading prior sessions once.
    ///
    /// A store that cannot be read yields an empty ledger; the failure is
    /// logged, never returned. The unreadable history is quarantined on the
    /// first save rather than overwritten.
    pub fn open(store: Box<dyn Store>) -> Self {
        let (sessions, load_failed) =
            match load_records::<SessionRecord>(store.as_ref(), SESSIONS_COLLECTION) {
                Ok(sessions) => {
                    tracing::info!(count = sessions.len(), "loaded session history");
                    (sessions, false)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not load session history, starting empty");
                    (Vec::new(), true)
                }
            };
        Self {
            filtered: sessions.clone(),
            sessions,
            filter: SessionFilter::default(),
            store,
            load_failed,
            bus: EventBus::new(),
        }
    }

    pub fn subscribe<S>(&mut self, subscriber: S) -> SubscriberId
    where
        S: Subscriber + 'static,
    {
        self.bus.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Append, refresh the view, persist, then notify.
    pub fn log_session(&mut self, record: SessionRecord) {
        let event = Event::SessionLogged {
            session_id: record.id(),
            mode_name: record.mode_name().to_string(),
            duration_minutes: record.duration_minutes(),
            at: Utc::now(),
        };
        tracing::debug!(id = %record.id(), mode = record.mode_name(), "session logged");
        self.sessions.push(record);
        self.apply_filters();
        self.persist();
        self.bus.publish(event);
    }

    /// Either bound may be `None` (unbounded on that side). A start after
    /// the end simply matches nothing.
    pub fn filter_by_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.filter.start_date = start;
        self.filter.end_date = end;
        self.apply_filters();
    }

    pub fn filter_by_mode(&mut self, mode_name: impl Into<String>) {
        self.filter.mode = Some(mode_name.into());
        self.apply_filters();
    }

    pub fn clear_mode_filter(&mut self) {
        self.filter.mode = None;
        self.apply_filters();
    }

    pub fn clear_filters(&mut self) {
        self.filter = SessionFilter::default();
        self.apply_filters();
    }

    pub fn filter(&self) -> &SessionFilter {
        &self.filter
    }

    pub fn all_sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn filtered_sessions(&self) -> &[SessionRecord] {
        &self.filtered
    }

    /// A window of the filtered view, for paged display.
    pub fn page(&self, offset: usize, limit: usize) -> &[SessionRecord] {
        let start = offset.min(self.filtered.len());
        let end = start.saturating_add(limit).min(self.filtered.len());
        &self.filtered[start..end]
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn completed_session_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.is_completed()).count()
    }

    /// Sum of `duration_minutes` over completed sessions.
    pub fn total_focus_minutes(&self) -> u64 {
        self.sessions
            .iter()
            .filter(|s| s.is_completed())
            .map(|s| u64::from(s.duration_minutes()))
            .sum()
    }

    fn apply_filters(&mut self) {
        self.filtered = self
            .sessions
            .iter()
            .filter(|s| self.filter.matches(s))
            .cloned()
            .collect();
    }

    fn persist(&mut self) {
        if self.load_failed {
            if let Err(e) = self.store.quarantine(SESSIONS_COLLECTION) {
                tracing::warn!(error = %e, "unreadable session history could not be moved aside, not saving");
                return;
            }
            tracing::warn!(
                collection = %quarantined_name(SESSIONS_COLLECTION),
                "moved unreadable session history aside"
            );
            self.load_failed = false;
        }
        if let Err(e) = save_records(self.store.as_ref(), SESSIONS_COLLECTION, &self.sessions) {
            tracing::warn!(error = %e, "failed to persist sessions");
        }
    }
}

impl std::fmt::Debug for SessionLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLedger")
            .field("sessions", &self.sessions.len())
            .field("filtered", &self.filtered.len())
            .field("filter", &self.filter)
            .finish()
    }
}
