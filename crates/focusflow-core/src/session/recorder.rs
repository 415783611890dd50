use std::sync::{Arc, Mutex, PoisonError};

use chrono::Duration;

use super::ledger::SessionLedger;
use super::record::SessionRecord;
use crate::bus::Subscriber;
use crate::events::Event;

/// Engine subscriber that turns `SessionCompleted` into a ledger entry.
///
/// Must not be attached to the ledger's own bus: `log_session` publishes
/// there while this subscriber holds the ledger lock.
pub struct SessionRecorder {
    ledger: Arc<Mutex<SessionLedger>>,
}

impl SessionRecorder {
    pub fn new(ledger: Arc<Mutex<SessionLedger>>) -> Self {
        Self { ledger }
    }
}

impl Subscriber for SessionRecorder {
    fn on_event(&mut self, event: &Event) {
        let Event::SessionCompleted {
            elapsed_secs,
            mode,
            at,
        } = event
        else {
            return;
        };
        let elapsed = Duration::seconds(i64::try_from(*elapsed_secs).unwrap_or(i64::MAX / 1000));
        let mut record = SessionRecord::for_mode(mode, *at - elapsed);
        record.complete_at(*at);
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .log_session(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::timer::{TimerEngine, TimerMode};

    fn shared_ledger() -> Arc<Mutex<SessionLedger>> {
        Arc::new(Mutex::new(SessionLedger::open(Box::new(MemoryStore::new()))))
    }

    #[test]
    fn completed_work_phase_is_logged() {
        let ledger = shared_ledger();
        let mut engine = TimerEngine::new(TimerMode::custom(2, 1).unwrap());
        engine.subscribe(SessionRecorder::new(ledger.clone()));

        engine.start();
        for _ in 0..120 {
            engine.tick();
        }

        let ledger = ledger.lock().unwrap();
        assert_eq!(ledger.session_count(), 1);
        let record = &ledger.all_sessions()[0];
        assert!(record.is_completed());
        assert_eq!(record.mode_name(), "Custom");
        assert_eq!(record.planned_duration_minutes(), 2);
        assert_eq!(record.actual_duration_minutes(), 2);
    }

    #[test]
    fn skipped_work_phase_is_not_logged() {
        let ledger = shared_ledger();
        let mut engine = TimerEngine::default();
        engine.subscribe(SessionRecorder::new(ledger.clone()));

        engine.start();
        engine.tick();
        engine.skip();

        assert_eq!(ledger.lock().unwrap().session_count(), 0);
    }
}
