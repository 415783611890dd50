//! Composition root: builds exactly one timer service, ledger and planner
//! and wires the ledger to the timer's `SessionCompleted` events.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::planner::Planner;
use crate::session::{SessionLedger, SessionRecorder};
use crate::stats::{Statistics, StatsSummary};
use crate::storage::{data_dir, open_store, Config, Store};
use crate::timer::{TimerEngine, TimerService};

pub struct FocusFlow {
    config: Config,
    timer: TimerService,
    ledger: Arc<Mutex<SessionLedger>>,
    planner: Planner,
}

impl FocusFlow {
    /// Wire everything over explicit stores. The timer starts in the
    /// configured default mode, falling back to the built-in default when
    /// the configured one is invalid.
    pub fn new(config: Config, sessions: Box<dyn Store>, planner: Box<dyn Store>) -> Self {
        let mode = config.default_mode().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "invalid default mode in config, using Pomodoro");
            Default::default()
        });
        let ledger = Arc::new(Mutex::new(SessionLedger::open(sessions)));
        let timer = TimerService::new(TimerEngine::new(mode));
        timer.subscribe(SessionRecorder::new(ledger.clone()));
        Self {
            config,
            timer,
            ledger,
            planner: Planner::open(planner),
        }
    }

    /// Load the config and open the configured stores in `dir`.
    pub fn open_in(dir: &Path) -> Result<Self> {
        let config = Config::load_from(&dir.join("config.toml"))?;
        let sessions = open_store(&config, dir)?;
        let planner = open_store(&config, dir)?;
        tracing::info!(dir = %dir.display(), backend = ?config.storage.backend, "opened data directory");
        Ok(Self::new(config, sessions, planner))
    }

    /// Open in the default data directory.
    pub fn open() -> Result<Self> {
        Self::open_in(&data_dir()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn timer(&self) -> &TimerService {
        &self.timer
    }

    pub fn ledger(&self) -> MutexGuard<'_, SessionLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn shared_ledger(&self) -> Arc<Mutex<SessionLedger>> {
        self.ledger.clone()
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut Planner {
        &mut self.planner
    }

    pub fn stats(&self) -> StatsSummary {
        Statistics::new(&self.ledger()).summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageBackend};
    use crate::timer::TimerMode;
    use tempfile::TempDir;

    #[test]
    fn completed_timer_phase_reaches_ledger() {
        let mut config = Config::default();
        config.timer.default_mode = "Custom".into();
        config.timer.custom_work_minutes = 1;
        config.timer.custom_break_minutes = 1;
        let app = FocusFlow::new(
            config,
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
        );
        assert_eq!(app.timer().mode(), TimerMode::custom(1, 1).unwrap());

        app.timer().with_engine(|engine| {
            engine.start();
            for _ in 0..60 {
                engine.tick();
            }
        });
        assert_eq!(app.ledger().session_count(), 1);
        assert_eq!(app.stats().completed_sessions, 1);
    }

    #[test]
    fn invalid_default_mode_falls_back() {
        let mut config = Config::default();
        config.timer.default_mode = "Nope".into();
        let app = FocusFlow::new(
            config,
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
        );
        assert_eq!(app.timer().mode(), TimerMode::Pomodoro);
    }

    #[test]
    fn open_in_uses_configured_backend() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Sqlite;
        config.save_to(&tmp.path().join("config.toml")).unwrap();

        let mut app = FocusFlow::open_in(tmp.path()).unwrap();
        app.planner_mut()
            .add_event(
                "Seminar",
                "",
                chrono::NaiveDate::from_ymd_opt(2026, 2, 2)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap(),
                None,
            )
            .unwrap();
        drop(app);

        assert!(tmp.path().join("focusflow.db").exists());
        let app = FocusFlow::open_in(tmp.path()).unwrap();
        assert_eq!(app.planner().events().len(), 1);
    }
}
