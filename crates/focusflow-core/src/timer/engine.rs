//! Timer phase engine.
//!
//! A single-threaded state machine over `phase x running`. It has no
//! internal clock: whoever drives it (normally [`TimerService`]) calls
//! `tick()` once per second while it is running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle-Work <-> Running-Work
//!     ^               | remaining hits 0 / skip
//!     | reset         v
//! Idle-Break <-> Running-Break
//! ```
//!
//! Every change to the active phase goes through `switch_phase()`, so a
//! natural completion and a skip end in the same state.
//!
//! [`TimerService`]: super::TimerService

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::TimerMode;
use crate::bus::{EventBus, Subscriber, SubscriberId};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    IdleWork,
    RunningWork,
    IdleBreak,
    RunningBreak,
}

/// Point-in-time view of the engine, for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub state: TimerState,
    pub phase: Phase,
    pub remaining_secs: u64,
    pub elapsed_secs: u64,
    pub is_running: bool,
    /// `MM:SS`
    pub display: String,
}

#[derive(Debug)]
pub struct TimerEngine {
    mode: TimerMode,
    phase: Phase,
    remaining_secs: u64,
    /// Seconds elapsed in the current phase. Zeroed at every phase switch.
    elapsed_secs: u64,
    running: bool,
    bus: EventBus,
}

impl TimerEngine {
    /// Create an idle engine in the work phase of `mode`.
    pub fn new(mode: TimerMode) -> Self {
        Self {
            mode,
            phase: Phase::Work,
            remaining_secs: mode.work_secs(),
            elapsed_secs: 0,
            running: false,
            bus: EventBus::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_work_phase(&self) -> bool {
        self.phase == Phase::Work
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn state(&self) -> TimerState {
        match (self.phase, self.running) {
            (Phase::Work, false) => TimerState::IdleWork,
            (Phase::Work, true) => TimerState::RunningWork,
            (Phase::Break, false) => TimerState::IdleBreak,
            (Phase::Break, true) => TimerState::RunningBreak,
        }
    }

    /// Configured length of the current phase.
    pub fn phase_secs(&self) -> u64 {
        match self.phase {
            Phase::Work => self.mode.work_secs(),
            Phase::Break => self.mode.break_secs(),
        }
    }

    pub fn formatted_time(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.mode,
            state: self.state(),
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            elapsed_secs: self.elapsed_secs,
            is_running: self.running,
            display: self.formatted_time(),
        }
    }

    // ── Subscribers ──────────────────────────────────────────────────

    pub fn subscribe<S>(&mut self, subscriber: S) -> SubscriberId
    where
        S: Subscriber + 'static,
    {
        self.bus.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns `false` (and publishes nothing) if already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        tracing::debug!(remaining = self.remaining_secs, phase = ?self.phase, "timer started");
        let event = Event::TimerStarted {
            remaining_secs: self.remaining_secs,
            is_work_phase: self.is_work_phase(),
            mode_name: self.mode.name().to_string(),
            at: Utc::now(),
        };
        self.bus.publish(event);
        true
    }

    /// Returns `false` (and publishes nothing) if not running.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        tracing::debug!(remaining = self.remaining_secs, "timer paused");
        let event = Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            is_work_phase: self.is_work_phase(),
            mode_name: self.mode.name().to_string(),
            at: Utc::now(),
        };
        self.bus.publish(event);
        true
    }

    /// Back to the start of the work phase, stopped. Always succeeds.
    pub fn reset(&mut self) {
        self.running = false;
        self.elapsed_secs = 0;
        self.phase = Phase::Work;
        self.remaining_secs = self.mode.work_secs();
        tracing::debug!(mode = self.mode.name(), "timer reset");
        self.publish_reset();
    }

    /// Abandon the current phase and move to the other one. Never
    /// publishes `SessionCompleted`.
    pub fn skip(&mut self) {
        self.running = false;
        tracing::debug!(phase = ?self.phase, remaining = self.remaining_secs, "phase skipped");
        self.switch_phase();
    }

    pub fn set_mode(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.reset();
        self.bus.publish(Event::ModeChanged {
            mode,
            at: Utc::now(),
        });
    }

    /// Advance one second. No-op unless running.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            self.elapsed_secs += 1;
            let event = Event::TimerTick {
                remaining_secs: self.remaining_secs,
                is_work_phase: self.is_work_phase(),
                mode_name: self.mode.name().to_string(),
                at: Utc::now(),
            };
            self.bus.publish(event);
        }
        if self.remaining_secs == 0 {
            self.complete_phase();
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_phase(&mut self) {
        self.running = false;
        let now = Utc::now();
        tracing::debug!(phase = ?self.phase, elapsed = self.elapsed_secs, "phase completed");
        self.bus.publish(Event::TimerCompleted {
            remaining_secs: self.remaining_secs,
            is_work_phase: self.is_work_phase(),
            mode_name: self.mode.name().to_string(),
            at: now,
        });
        if self.phase == Phase::Work {
            self.bus.publish(Event::SessionCompleted {
                elapsed_secs: self.elapsed_secs,
                mode: self.mode,
                at: now,
            });
        }
        self.switch_phase();
    }

    fn switch_phase(&mut self) {
        self.phase = match self.phase {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        };
        self.elapsed_secs = 0;
        self.remaining_secs = self.phase_secs();
        self.publish_reset();
    }

    fn publish_reset(&mut self) {
        let event = Event::TimerReset {
            remaining_secs: self.remaining_secs,
            is_work_phase: self.is_work_phase(),
            mode_name: self.mode.name().to_string(),
            at: Utc::now(),
        };
        self.bus.publish(event);
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(TimerMode::default())
    }
}
