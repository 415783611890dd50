//! # FocusFlow Core Library
//!
//! Core business logic for the FocusFlow focus timer. Presentation layers
//! (the CLI in this workspace, or any GUI) sit on top of it and only talk
//! to the types re-exported here.
//!
//! ## Architecture
//!
//! - **Mode Catalog**: closed set of work/break presets plus a validated
//!   custom pair
//! - **Timer Engine**: a phase state machine; the caller (or
//!   [`TimerService`]) invokes `tick()` once per second
//! - **Event Bus**: ordered, synchronous publish/subscribe for timer and
//!   ledger events
//! - **Session Ledger**: append-only session history with filtered views
//!   and statistics
//! - **Storage**: JSON-file or SQLite collection stores and TOML settings
//! - **Planner**: calendar events with ICS import/export
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`SessionLedger`]: Session history and filters
//! - [`Statistics`]: Aggregates over the ledger
//! - [`FocusFlow`]: Composition root wiring the pieces together

pub mod app;
pub mod bus;
pub mod error;
pub mod events;
pub mod planner;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use app::FocusFlow;
pub use bus::{ChannelSubscriber, EventBus, Subscriber, SubscriberId};
pub use error::{ConfigError, CoreError, PlannerError, StorageError, ValidationError};
pub use events::Event;
pub use planner::{Planner, PlannerEvent};
pub use session::{SessionFilter, SessionLedger, SessionRecord, SessionRecorder};
pub use stats::{Statistics, StatsSummary};
pub use storage::{Config, JsonFileStore, MemoryStore, SqliteStore, Store};
pub use timer::{Phase, TimerEngine, TimerMode, TimerService, TimerSnapshot, TimerState};
