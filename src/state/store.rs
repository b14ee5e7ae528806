//! Timer store: owns the collection and serializes every transition

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, trace, warn};

use super::{
    collection::{BulkOperation, TimerAction, TimerCollection},
    completion::{self, NoticeKind, TimerNotice},
    notifications::NotificationQueue,
    timer::{HistoryEntry, NewTimer, Timer, TimerId},
};
use crate::{error::ValidationError, tasks::scheduler::Tick, utils::clock::Clock};

/// Receiving ends handed to the persistence writers
#[derive(Debug)]
pub struct PersistenceChannels {
    /// Latest timer collection; superseded snapshots are skipped
    pub snapshots: watch::Receiver<TimerCollection>,
    /// Latest history log, most recent first; superseded copies are skipped
    pub history: watch::Receiver<Vec<HistoryEntry>>,
}

/// The single owner of the timer collection.
///
/// User actions and scheduler ticks all go through [`TimerStore::dispatch`],
/// which holds the collection lock for the whole transition, so no two
/// transitions ever interleave. Each transition is followed by completion
/// detection, a snapshot for persistence and any notifications.
///
/// The history log lives here too. Completions are added to the front of the
/// in-memory log and the whole log is handed to the writer, so a failed save
/// is repaired by the next one.
pub struct TimerStore {
    timers: Mutex<TimerCollection>,
    notifications: Mutex<NotificationQueue>,
    clock: Arc<dyn Clock>,
    snapshot_tx: watch::Sender<TimerCollection>,
    /// Holds the authoritative history log
    history_tx: watch::Sender<Vec<HistoryEntry>>,
    notice_tx: broadcast::Sender<TimerNotice>,
}

impl TimerStore {
    /// Create an empty store and the channels its persistence writers consume
    pub fn new(clock: Arc<dyn Clock>) -> (Self, PersistenceChannels) {
        let (snapshot_tx, snapshots) = watch::channel(TimerCollection::new());
        let (history_tx, history) = watch::channel(Vec::new());
        let (notice_tx, _) = broadcast::channel(100);

        let store = Self {
            timers: Mutex::new(TimerCollection::new()),
            notifications: Mutex::new(NotificationQueue::new()),
            clock,
            snapshot_tx,
            history_tx,
            notice_tx,
        };
        (store, PersistenceChannels { snapshots, history })
    }

    /// Apply an action and return the resulting collection
    pub fn dispatch(&self, action: TimerAction) -> TimerCollection {
        if matches!(action, TimerAction::Tick) {
            trace!("Dispatching tick");
        } else {
            debug!("Dispatching {} action", action.label());
        }
        self.transition(|collection, now| (collection.apply(action, now), ()))
            .0
    }

    /// Validate and add a new timer, returning its id
    pub fn add_timer(&self, name: &str, duration: i64, category: &str) -> Result<TimerId, ValidationError> {
        let input = NewTimer::new(name, duration, category).inspect_err(|e| {
            warn!("Rejected new timer {:?}: {}", name, e);
        })?;
        Ok(self.add(input))
    }

    /// Add an already validated timer, returning its id
    pub fn add(&self, input: NewTimer) -> TimerId {
        info!("Adding timer {:?} ({}s) to category {:?}", input.name(), input.duration(), input.category());
        self.transition(|collection, now| collection.add_with_id(input, now))
            .1
    }

    pub fn start_timer(&self, id: &TimerId) -> TimerCollection {
        self.dispatch(TimerAction::Start(id.clone()))
    }

    pub fn pause_timer(&self, id: &TimerId) -> TimerCollection {
        self.dispatch(TimerAction::Pause(id.clone()))
    }

    pub fn reset_timer(&self, id: &TimerId) -> TimerCollection {
        self.dispatch(TimerAction::Reset(id.clone()))
    }

    pub fn bulk_action(&self, category: &str, operation: BulkOperation) -> TimerCollection {
        info!("Bulk {} on category {:?}", operation, category);
        self.dispatch(TimerAction::Bulk {
            category: category.to_string(),
            operation,
        })
    }

    pub fn mark_saved(&self, id: &TimerId) -> TimerCollection {
        self.dispatch(TimerAction::MarkSaved(id.clone()))
    }

    /// Replace the collection with persisted timers, taken verbatim
    pub fn load_timers(&self, timers: Vec<Timer>) -> TimerCollection {
        info!("Loaded {} timers", timers.len());
        self.dispatch(TimerAction::Load(timers))
    }

    /// Put the persisted history log behind any completions already recorded.
    ///
    /// The merged log is only handed to the writer when this run recorded
    /// something before the load; otherwise storage already holds it.
    pub fn load_history(&self, history: Vec<HistoryEntry>) {
        info!("Loaded {} history entries", history.len());
        let _transition = lock(&self.timers);
        self.history_tx.send_if_modified(|log| {
            let recorded = std::mem::take(log);
            let changed = !recorded.is_empty();
            *log = recorded.into_iter().chain(history).collect();
            changed
        });
    }

    /// History log, most recent first
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history_tx.borrow().clone()
    }

    /// Current collection snapshot
    pub fn timers(&self) -> TimerCollection {
        lock(&self.timers).clone()
    }

    pub fn timer(&self, id: &TimerId) -> Option<Timer> {
        lock(&self.timers).get(id).cloned()
    }

    /// Watch every collection the store produces
    pub fn subscribe_timers(&self) -> watch::Receiver<TimerCollection> {
        self.snapshot_tx.subscribe()
    }

    /// Receive halfway and completion notices as they happen
    pub fn subscribe_notices(&self) -> broadcast::Receiver<TimerNotice> {
        self.notice_tx.subscribe()
    }

    /// Completion notice currently awaiting dismissal
    pub fn current_notification(&self) -> Option<TimerNotice> {
        lock(&self.notifications).current().cloned()
    }

    pub fn dismiss_notification(&self) -> Option<TimerNotice> {
        lock(&self.notifications).dismiss()
    }

    pub fn pending_notifications(&self) -> usize {
        lock(&self.notifications).len()
    }

    /// Run one transition under the collection lock, then detect completions
    /// and publish the effects before releasing it.
    fn transition<R>(
        &self,
        f: impl FnOnce(TimerCollection, DateTime<Utc>) -> (TimerCollection, R),
    ) -> (TimerCollection, R) {
        let now = self.clock.now();
        let mut timers = lock(&self.timers);

        let (next, result) = f(timers.clone(), now);
        let (next, detection) = completion::detect(next, now);

        if *timers != next {
            *timers = next.clone();
            self.snapshot_tx.send_replace(next.clone());
        }

        if !detection.history.is_empty() {
            self.history_tx.send_modify(|log| {
                for entry in detection.history {
                    log.insert(0, entry);
                }
            });
        }

        for notice in detection.notices {
            match notice.kind {
                NoticeKind::Completed => {
                    info!("Timer completed: {}", notice.name);
                    lock(&self.notifications).push(notice.clone());
                }
                NoticeKind::Halfway => info!("Timer halfway: {}", notice.name),
            }
            // No subscribers is fine
            let _ = self.notice_tx.send(notice);
        }

        (next, result)
    }
}

impl Tick for TimerStore {
    fn tick(&self) {
        self.dispatch(TimerAction::Tick);
    }
}

impl std::fmt::Debug for TimerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerStore")
            .field("timers", &lock(&self.timers).len())
            .field("pending_notifications", &lock(&self.notifications).len())
            .field("history", &self.history_tx.borrow().len())
            .finish()
    }
}

/// Transitions replace the collection wholesale, so a poisoned lock still
/// guards a consistent value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
