mod engine;
mod mode;
mod service;

pub use engine::{Phase, TimerEngine, TimerSnapshot, TimerState};
pub use mode::{CustomDurations, TimerMode};
pub use service::TimerService;
