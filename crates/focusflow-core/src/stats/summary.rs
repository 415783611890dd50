//! On-demand statistics over the ledger's full session history.
//!
//! Nothing here is cached; every call rescans the sessions.

use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::session::{SessionLedger, SessionRecord};

/// Serializable snapshot of every statistic, computed for a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_sessions: usize,
    pub completed_sessions: usize,
    pub total_focus_minutes: u64,
    pub total_focus_seconds: u64,
    pub average_session_minutes: f64,
    pub average_session_length: u64,
    pub completion_rate: f64,
    pub current_streak: u32,
    pub today_sessions: usize,
    pub today_focus_minutes: u64,
}

pub struct Statistics<'a> {
    sessions: &'a [SessionRecord],
}

impl<'a> Statistics<'a> {
    pub fn new(ledger: &'a SessionLedger) -> Self {
        Self::from_sessions(ledger.all_sessions())
    }

    pub fn from_sessions(sessions: &'a [SessionRecord]) -> Self {
        Self { sessions }
    }

    pub fn total_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn completed_sessions(&self) -> usize {
        self.sessions.iter().filter(|s| s.is_completed()).count()
    }

    pub fn total_focus_minutes(&self) -> u64 {
        self.sessions
            .iter()
            .filter(|s| s.is_completed())
            .map(|s| u64::from(s.duration_minutes()))
            .sum()
    }

    pub fn total_focus_seconds(&self) -> u64 {
        self.total_focus_minutes() * 60
    }

    /// Mean `duration_minutes` over all sessions; 0 when empty.
    pub fn average_session_duration(&self) -> f64 {
        if self.sessions.is_empty() {
            return 0.0;
        }
        let total: u64 = self
            .sessions
            .iter()
            .map(|s| u64::from(s.duration_minutes()))
            .sum();
        total as f64 / self.sessions.len() as f64
    }

    /// Average duration rounded to whole minutes.
    pub fn average_session_length(&self) -> u64 {
        self.average_session_duration().round() as u64
    }

    /// Percentage of sessions completed; 0 when empty.
    pub fn completion_rate(&self) -> f64 {
        if self.sessions.is_empty() {
            return 0.0;
        }
        self.completed_sessions() as f64 * 100.0 / self.sessions.len() as f64
    }

    /// Consecutive days, ending at `today`, with a completed session.
    pub fn current_streak_on(&self, today: NaiveDate) -> u32 {
        let days: HashSet<NaiveDate> = self
            .sessions
            .iter()
            .filter(|s| s.is_completed())
            .map(SessionRecord::start_date)
            .collect();

        let mut streak = 0;
        let mut day = today;
        while days.contains(&day) {
            streak += 1;
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
        streak
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak_on(Local::now().date_naive())
    }

    pub fn summary_on(&self, today: NaiveDate) -> StatsSummary {
        let todays = || {
            self.sessions
                .iter()
                .filter(move |s| s.is_completed() && s.start_date() == today)
        };
        StatsSummary {
            total_sessions: self.total_sessions(),
            completed_sessions: self.completed_sessions(),
            total_focus_minutes: self.total_focus_minutes(),
            total_focus_seconds: self.total_focus_seconds(),
            average_session_minutes: self.average_session_duration(),
            average_session_length: self.average_session_length(),
            completion_rate: self.completion_rate(),
            current_streak: self.current_streak_on(today),
            today_sessions: todays().count(),
            today_focus_minutes: todays().map(|s| u64::from(s.duration_minutes())).sum(),
        }
    }

    pub fn summary(&self) -> StatsSummary {
        self.summary_on(Local::now().date_naive())
    }
}
