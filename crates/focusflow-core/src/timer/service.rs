//! Async driver for [`TimerEngine`].
//!
//! Owns the engine behind a mutex and a single ticker task on the tokio
//! runtime. Commands and ticks both take the lock, so they are serialized.
//! Outside a tokio runtime `start()` refuses and leaves the timer stopped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::engine::{TimerEngine, TimerSnapshot};
use super::mode::TimerMode;
use crate::bus::{Subscriber, SubscriberId};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct TimerService {
    engine: Arc<Mutex<TimerEngine>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TimerService {
    pub fn new(engine: TimerEngine) -> Self {
        Self::with_interval(engine, TICK_INTERVAL)
    }

    pub fn with_interval(engine: TimerEngine, tick_interval: Duration) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            ticker: Arc::new(Mutex::new(None)),
            tick_interval,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        lock(&self.engine).snapshot()
    }

    pub fn is_running(&self) -> bool {
        lock(&self.engine).is_running()
    }

    pub fn mode(&self) -> TimerMode {
        lock(&self.engine).mode()
    }

    pub fn subscribe<S>(&self, subscriber: S) -> SubscriberId
    where
        S: Subscriber + 'static,
    {
        lock(&self.engine).subscribe(subscriber)
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        lock(&self.engine).unsubscribe(id)
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut TimerEngine) -> R) -> R {
        f(&mut lock(&self.engine))
    }

    /// Returns `false` if already running or if no tokio runtime is
    /// available to drive the ticks.
    pub fn start(&self) -> bool {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("no tokio runtime to drive the timer, not starting");
            return false;
        };
        let started = lock(&self.engine).start();
        if started {
            self.spawn_ticker(&runtime);
        }
        started
    }

    pub fn pause(&self) -> bool {
        self.cancel_ticker();
        lock(&self.engine).pause()
    }

    pub fn reset(&self) {
        self.cancel_ticker();
        lock(&self.engine).reset();
    }

    pub fn skip(&self) {
        self.cancel_ticker();
        lock(&self.engine).skip();
    }

    pub fn set_mode(&self, mode: TimerMode) {
        self.cancel_ticker();
        lock(&self.engine).set_mode(mode);
    }

    fn spawn_ticker(&self, runtime: &Handle) {
        let mut ticker = lock(&self.ticker);
        if let Some(handle) = ticker.take() {
            handle.abort();
        }

        let engine = self.engine.clone();
        let period = self.tick_interval;
        let handle = runtime.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let still_running = {
                    let mut guard = lock(&engine);
                    if guard.is_running() {
                        guard.tick();
                    }
                    guard.is_running()
                };
                if !still_running {
                    break;
                }
            }
            tracing::trace!("ticker stopped");
        });
        *ticker = Some(handle);
    }

    fn cancel_ticker(&self) {
        if let Some(handle) = lock(&self.ticker).take() {
            handle.abort();
        }
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        // Last handle gone: nothing else can stop the ticker.
        if Arc::strong_count(&self.ticker) == 1 {
            self.cancel_ticker();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ChannelSubscriber;
    use crate::events::Event;

    /// Let the ticker task observe the advanced clock.
    async fn advance(secs: u64) {
        for _ in 0..secs {
            time::advance(Duration::from_secs(1)).await;
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_while_running() {
        let service = TimerService::new(TimerEngine::default());
        service.start();
        advance(5).await;
        assert_eq!(service.snapshot().remaining_secs, 1495);
        assert!(service.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_ticking() {
        let service = TimerService::new(TimerEngine::default());
        service.start();
        advance(3).await;
        assert!(service.pause());
        advance(10).await;
        assert_eq!(service.snapshot().remaining_secs, 1497);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_does_not_double_tick() {
        let service = TimerService::new(TimerEngine::default());
        service.start();
        service.pause();
        service.start();
        advance(4).await;
        assert_eq!(service.snapshot().remaining_secs, 1496);
    }

    #[tokio::test(start_paused = true)]
    async fn runs_work_phase_to_completion() {
        let service = TimerService::new(TimerEngine::new(TimerMode::custom(1, 1).unwrap()));
        let (sub, mut rx) = ChannelSubscriber::new();
        service.subscribe(sub);

        service.start();
        advance(61).await;

        let snap = service.snapshot();
        assert!(!snap.is_running);
        assert_eq!(snap.remaining_secs, 60);
        assert_eq!(snap.phase, crate::timer::Phase::Break);

        let mut completed = 0;
        while let Ok(event) = rx.try_recv() {
            if let Event::SessionCompleted { elapsed_secs, .. } = event {
                assert_eq!(elapsed_secs, 60);
                completed += 1;
            }
        }
        assert_eq!(completed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn set_mode_stops_running_timer() {
        let service = TimerService::new(TimerEngine::default());
        service.start();
        advance(2).await;
        service.set_mode(TimerMode::Ultradian);
        advance(3).await;
        let snap = service.snapshot();
        assert!(!snap.is_running);
        assert_eq!(snap.remaining_secs, 90 * 60);
    }

    #[tokio::test(start_paused = true)]
    async fn skip_stops_running_timer() {
        let service = TimerService::new(TimerEngine::default());
        service.start();
        advance(4).await;
        service.skip();
        advance(5).await;

        let snap = service.snapshot();
        assert!(!snap.is_running);
        assert_eq!(snap.phase, crate::timer::Phase::Break);
        assert_eq!(snap.remaining_secs, 5 * 60);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_running_timer() {
        let service = TimerService::new(TimerEngine::default());
        service.start();
        advance(7).await;
        service.reset();
        advance(5).await;

        let snap = service.snapshot();
        assert!(!snap.is_running);
        assert_eq!(snap.phase, crate::timer::Phase::Work);
        assert_eq!(snap.remaining_secs, 25 * 60);
    }

    #[test]
    fn start_without_runtime_is_refused() {
        let service = TimerService::new(TimerEngine::default());
        assert!(!service.start());
        assert!(!service.is_running());
        assert_eq!(service.snapshot().remaining_secs, 25 * 60);
    }
}
