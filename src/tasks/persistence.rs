//! Persistence writer background tasks

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    error::PersistenceError,
    services::PersistenceGateway,
    state::{HistoryEntry, PersistenceChannels, TimerCollection, TimerStore},
};

/// Handles to the running writers
#[derive(Debug)]
pub struct PersistenceHandle {
    timers: JoinHandle<()>,
    history: JoinHandle<()>,
}

impl PersistenceHandle {
    /// Wait for both writers to drain their backlog and exit.
    ///
    /// They exit once the store that feeds them has been dropped.
    pub async fn join(self) {
        if let Err(e) = self.timers.await {
            error!("Timer writer ended abnormally: {}", e);
        }
        if let Err(e) = self.history.await {
            error!("History writer ended abnormally: {}", e);
        }
    }
}

/// Spawn the timer snapshot writer and the history log writer
pub fn spawn_persistence(channels: PersistenceChannels, gateway: PersistenceGateway) -> PersistenceHandle {
    let PersistenceChannels { snapshots, history } = channels;
    PersistenceHandle {
        timers: tokio::spawn(timers_writer_task(snapshots, gateway.clone())),
        history: tokio::spawn(history_writer_task(history, gateway)),
    }
}

/// Load the persisted history log into the store.
///
/// Run this before [`restore_timers`], which may record completions. On
/// failure the store keeps an empty log and the next completion overwrites
/// whatever storage held.
pub async fn restore_history(store: &TimerStore, gateway: &PersistenceGateway) -> Result<usize, PersistenceError> {
    let history = gateway.load_history().await?;
    let count = history.len();
    store.load_history(history);
    Ok(count)
}

/// Load persisted timers into the store as the new baseline.
///
/// Returns how many timers were restored. On failure the store keeps its
/// current collection.
pub async fn restore_timers(store: &TimerStore, gateway: &PersistenceGateway) -> Result<usize, PersistenceError> {
    let timers = gateway.load_timers().await?;
    let count = timers.len();
    store.load_timers(timers);
    Ok(count)
}

/// Save the newest timer snapshot whenever the store changes.
///
/// Snapshots produced while a save is in flight are coalesced; only the
/// latest one is written next. A snapshot whose save failed when the store
/// went away gets one last attempt.
pub async fn timers_writer_task(mut snapshots: watch::Receiver<TimerCollection>, gateway: PersistenceGateway) {
    info!("Starting timer writer task");

    let mut unsaved = None;
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        unsaved = match gateway.save_timers(&snapshot).await {
            Ok(()) => {
                debug!("Saved {} timers", snapshot.len());
                None
            }
            Err(e) => {
                warn!("Failed to save timers, next change will retry: {}", e);
                Some(snapshot)
            }
        };
    }

    if let Some(snapshot) = unsaved {
        match gateway.save_timers(&snapshot).await {
            Ok(()) => info!("Saved {} timers on final retry", snapshot.len()),
            Err(e) => error!("Timers were not saved before shutdown: {}", e),
        }
    }

    info!("Timer writer stopped");
}

/// Save the whole history log whenever a completion is recorded.
///
/// Works like [`timers_writer_task`]: every save replaces the stored log with
/// the newest in-memory copy, so a failed save loses nothing as long as a
/// later one succeeds.
pub async fn history_writer_task(mut history: watch::Receiver<Vec<HistoryEntry>>, gateway: PersistenceGateway) {
    info!("Starting history writer task");

    let mut unsaved = None;
    while history.changed().await.is_ok() {
        let log = history.borrow_and_update().clone();
        unsaved = match gateway.save_history(&log).await {
            Ok(()) => {
                debug!("Saved {} history entries", log.len());
                None
            }
            Err(e) => {
                error!("Failed to save history, next completion will retry: {}", e);
                Some(log)
            }
        };
    }

    if let Some(log) = unsaved {
        match gateway.save_history(&log).await {
            Ok(()) => info!("Saved {} history entries on final retry", log.len()),
            Err(e) => error!("History was not saved before shutdown: {}", e),
        }
    }

    info!("History writer stopped");
}
