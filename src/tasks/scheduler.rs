//! Tick scheduler background task

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info};

/// Anything advanced by the shared clock
pub trait Tick: Send + Sync {
    fn tick(&self);
}

struct Ticker {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Drives one global tick per period.
///
/// Runs on tokio's clock, so a paused test runtime advances it without real
/// delays. Every tick counts as exactly one unit; intervals missed while the
/// runtime was busy are delayed rather than replayed in a burst.
pub struct Scheduler {
    period: Duration,
    ticker: Mutex<Option<Ticker>>,
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ticker: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking `target`. Returns false if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, target: Arc<dyn Tick>) -> bool {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if ticker.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            debug!("Scheduler already running, ignoring start");
            return false;
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(tick_task(target, self.period, stop_rx));
        *ticker = Some(Ticker { stop_tx, handle });
        info!("Scheduler started with a {:?} period", self.period);
        true
    }

    /// Stop emitting ticks. Returns false if it was not running.
    pub fn stop(&self) -> bool {
        let ticker = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match ticker {
            Some(ticker) => {
                // The task may already be gone
                let _ = ticker.stop_tx.send(());
                info!("Scheduler stopped");
                true
            }
            None => false,
        }
    }

    /// Stop and wait until the tick task has exited
    pub async fn shutdown(&self) {
        let ticker = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(ticker) = ticker {
            let _ = ticker.stop_tx.send(());
            if let Err(e) = ticker.handle.await {
                error!("Tick task ended abnormally: {}", e);
            }
            info!("Scheduler shut down");
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("period", &self.period)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Call `target.tick()` once per period until told to stop
async fn tick_task(target: Arc<dyn Tick>, period: Duration, mut stop_rx: oneshot::Receiver<()>) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            biased;

            // Stop requested or scheduler dropped
            _ = &mut stop_rx => break,

            _ = interval.tick() => {
                target.tick();
                ticks += 1;
            }
        }
    }

    debug!("Tick task exiting after {} ticks", ticks);
}
