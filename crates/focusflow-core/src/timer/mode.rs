//! Mode catalog: the closed set of timing presets plus a user-defined pair.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Work/break minutes for a user-defined mode.
///
/// Fields are private so a zero duration can never be constructed;
/// deserialization goes through the same validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDurations")]
pub struct CustomDurations {
    work_minutes: u32,
    break_minutes: u32,
}

#[derive(Deserialize)]
struct RawDurations {
    work_minutes: u32,
    break_minutes: u32,
}

impl TryFrom<RawDurations> for CustomDurations {
    type Error = ValidationError;

    fn try_from(raw: RawDurations) -> Result<Self, Self::Error> {
        Self::new(raw.work_minutes, raw.break_minutes)
    }
}

impl CustomDurations {
    pub fn new(work_minutes: u32, break_minutes: u32) -> Result<Self, ValidationError> {
        if work_minutes == 0 {
            return Err(ValidationError::NonPositiveDuration { field: "work" });
        }
        if break_minutes == 0 {
            return Err(ValidationError::NonPositiveDuration { field: "break" });
        }
        Ok(Self {
            work_minutes,
            break_minutes,
        })
    }

    pub fn work_minutes(&self) -> u32 {
        self.work_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }
}

impl Default for CustomDurations {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
        }
    }
}

/// A named pair of work and break durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimerMode {
    /// 25/5
    Pomodoro,
    /// 52/17
    FiftyTwoSeventeen,
    /// 90/20
    Ultradian,
    Custom(CustomDurations),
}

impl TimerMode {
    /// The fixed presets, in display order.
    pub const PRESETS: [TimerMode; 3] = [
        TimerMode::Pomodoro,
        TimerMode::FiftyTwoSeventeen,
        TimerMode::Ultradian,
    ];

    /// Build a user-defined mode. Both durations must be positive.
    pub fn custom(work_minutes: u32, break_minutes: u32) -> Result<Self, ValidationError> {
        CustomDurations::new(work_minutes, break_minutes).map(TimerMode::Custom)
    }

    /// Look up a preset by name (case-insensitive). `Custom` is not a
    /// preset and must be built with [`TimerMode::custom`].
    pub fn preset(name: &str) -> Result<Self, ValidationError> {
        Self::PRESETS
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ValidationError::UnknownMode(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "Pomodoro",
            TimerMode::FiftyTwoSeventeen => "52/17",
            TimerMode::Ultradian => "Ultradian",
            TimerMode::Custom(_) => "Custom",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TimerMode::Pomodoro => {
                "25-minute focus sessions with 5-minute breaks. \
                 Classic technique for maintaining concentration."
            }
            TimerMode::FiftyTwoSeventeen => {
                "52-minute focus sessions with 17-minute breaks. \
                 Based on DeskTime research on peak productivity patterns."
            }
            TimerMode::Ultradian => {
                "90-minute focus sessions with 20-minute breaks. \
                 Aligned with natural ultradian rhythms for deep work."
            }
            TimerMode::Custom(_) => "Custom focus and break durations defined by the user.",
        }
    }

    pub fn work_minutes(&self) -> u32 {
        match self {
            TimerMode::Pomodoro => 25,
            TimerMode::FiftyTwoSeventeen => 52,
            TimerMode::Ultradian => 90,
            TimerMode::Custom(d) => d.work_minutes(),
        }
    }

    pub fn break_minutes(&self) -> u32 {
        match self {
            TimerMode::Pomodoro => 5,
            TimerMode::FiftyTwoSeventeen => 17,
            TimerMode::Ultradian => 20,
            TimerMode::Custom(d) => d.break_minutes(),
        }
    }

    /// Work phase length in seconds.
    pub fn work_secs(&self) -> u64 {
        u64::from(self.work_minutes()) * 60
    }

    /// Break phase length in seconds.
    pub fn break_secs(&self) -> u64 {
        u64::from(self.break_minutes()) * 60
    }
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::Pomodoro
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{})",
            self.name(),
            self.work_minutes(),
            self.break_minutes()
        )
    }
}
