use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::TimerMode;

/// Every state change in the timer or the ledger produces an Event.
/// Subscribers receive them through an [`EventBus`](crate::bus::EventBus).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        remaining_secs: u64,
        is_work_phase: bool,
        mode_name: String,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        is_work_phase: bool,
        mode_name: String,
        at: DateTime<Utc>,
    },
    /// Published by `reset()` and by every phase switch.
    TimerReset {
        remaining_secs: u64,
        is_work_phase: bool,
        mode_name: String,
        at: DateTime<Utc>,
    },
    TimerTick {
        remaining_secs: u64,
        is_work_phase: bool,
        mode_name: String,
        at: DateTime<Utc>,
    },
    /// A phase ran down to zero. Carries the state before the phase switch.
    TimerCompleted {
        remaining_secs: u64,
        is_work_phase: bool,
        mode_name: String,
        at: DateTime<Utc>,
    },
    /// A work phase ran to completion. Never published on skip.
    SessionCompleted {
        elapsed_secs: u64,
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    SessionLogged {
        session_id: Uuid,
        mode_name: String,
        duration_minutes: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Stable variant name, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "TimerStarted",
            Event::TimerPaused { .. } => "TimerPaused",
            Event::TimerReset { .. } => "TimerReset",
            Event::TimerTick { .. } => "TimerTick",
            Event::TimerCompleted { .. } => "TimerCompleted",
            Event::SessionCompleted { .. } => "SessionCompleted",
            Event::ModeChanged { .. } => "ModeChanged",
            Event::SessionLogged { .. } => "SessionLogged",
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerReset { at, .. }
            | Event::TimerTick { at, .. }
            | Event::TimerCompleted { at, .. }
            | Event::SessionCompleted { at, .. }
            | Event::ModeChanged { at, .. }
            | Event::SessionLogged { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_tag_matches_name() {
        let event = Event::ModeChanged {
            mode: TimerMode::Ultradian,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
        assert_eq!(json["mode"]["kind"], "ultradian");
    }
}
