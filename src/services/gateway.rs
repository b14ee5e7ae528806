//! Persistence gateway: typed load/save of timers and history

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use super::{export::ExportSink, key_value::KeyValueStore};
use crate::{
    error::{ExportError, PersistenceError},
    state::{HistoryEntry, Timer, TimerCollection},
};

pub const TIMERS_KEY: &str = "timers";
pub const HISTORY_KEY: &str = "history";

/// The only path from the core to durable storage.
///
/// Timers and history are stored independently as whole JSON documents;
/// every save replaces the full document.
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn KeyValueStore>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persisted timers, empty when nothing was saved yet
    pub async fn load_timers(&self) -> Result<Vec<Timer>, PersistenceError> {
        let timers: Vec<Timer> = self.load_json(TIMERS_KEY).await?;
        info!("Loaded {} timers from storage", timers.len());
        Ok(timers)
    }

    pub async fn save_timers(&self, timers: &TimerCollection) -> Result<(), PersistenceError> {
        self.save_json(TIMERS_KEY, timers).await
    }

    /// History log, most recent first
    pub async fn load_history(&self) -> Result<Vec<HistoryEntry>, PersistenceError> {
        self.load_json(HISTORY_KEY).await
    }

    pub async fn save_history(&self, history: &[HistoryEntry]) -> Result<(), PersistenceError> {
        self.save_json(HISTORY_KEY, history).await
    }

    /// Hand the history log to `sink` as pretty-printed JSON
    pub async fn export_history(&self, sink: &dyn ExportSink) -> Result<(), ExportError> {
        let history = self.load_history().await?;
        let text = serde_json::to_string_pretty(&history)?;
        info!("Exporting {} history entries", history.len());
        sink.share(super::export::EXPORT_TITLE, &text).await
    }

    async fn load_json<T>(&self, key: &str) -> Result<T, PersistenceError>
    where
        T: DeserializeOwned + Default,
    {
        match self.store.load(key).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Decode {
                key: key.to_string(),
                source,
            }),
            None => {
                debug!("Nothing stored under {}", key);
                Ok(T::default())
            }
        }
    }

    async fn save_json<T>(&self, key: &str, value: &T) -> Result<(), PersistenceError>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(value).map_err(|source| PersistenceError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.save(key, &bytes).await
    }
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::memory_store::MemoryStore,
        state::{BulkOperation, NewTimer, TimerId},
    };
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).single().unwrap()
    }

    fn gateway() -> (PersistenceGateway, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (PersistenceGateway::new(store.clone()), store)
    }

    fn entry(id: &str, secs: i64) -> HistoryEntry {
        HistoryEntry {
            id: TimerId::from(id),
            name: format!("timer {}", id),
            completed_at: at(secs),
        }
    }

    #[tokio::test]
    async fn timers_round_trip() {
        let (gateway, _) = gateway();
        let collection = TimerCollection::new()
            .add(NewTimer::new("Tea", 3, "Kitchen").unwrap(), at(0))
            .add(NewTimer::new("Run", 1, "Gym").unwrap(), at(0))
            .add(NewTimer::new("Read", 600, "Study").unwrap(), at(0))
            .bulk("Gym", BulkOperation::Start)
            .bulk("Study", BulkOperation::Start)
            .tick(at(1));

        gateway.save_timers(&collection).await.unwrap();
        let loaded = gateway.load_timers().await.unwrap();
        assert_eq!(TimerCollection::from_timers(loaded), collection);
    }

    #[tokio::test]
    async fn timers_document_matches_contract() {
        let (gateway, store) = gateway();
        let collection = TimerCollection::new()
            .add(NewTimer::new("Tea", 1, "Kitchen").unwrap(), at(0))
            .bulk("Kitchen", BulkOperation::Start)
            .tick(at(1));
        gateway.save_timers(&collection).await.unwrap();

        let raw: serde_json::Value = serde_json::from_slice(&store.get(TIMERS_KEY).unwrap()).unwrap();
        let timer = &raw[0];
        assert_eq!(timer["id"], "1700000000000");
        assert_eq!(timer["status"], "completed");
        assert_eq!(timer["remaining"], 0);
        assert_eq!(timer["halfwayAlertShown"], false);
        assert_eq!(timer["completedAtSaved"], false);
        assert!(timer["completedAt"].is_string());
    }

    #[tokio::test]
    async fn history_save_replaces_whole_log() {
        let (gateway, _) = gateway();
        gateway.save_history(&[entry("1", 10)]).await.unwrap();
        gateway.save_history(&[entry("2", 20), entry("1", 10)]).await.unwrap();

        let history = gateway.load_history().await.unwrap();
        let ids: Vec<_> = history.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
    }

    #[tokio::test]
    async fn corrupt_document_is_a_decode_error() {
        let (gateway, store) = gateway();
        store.insert(HISTORY_KEY, "not json");

        assert!(matches!(
            gateway.load_history().await,
            Err(PersistenceError::Decode { .. })
        ));
        assert_eq!(store.get(HISTORY_KEY), Some(b"not json".to_vec()));

        gateway.save_history(&[entry("1", 1)]).await.unwrap();
        assert_eq!(gateway.load_history().await.unwrap(), [entry("1", 1)]);
    }

    #[tokio::test]
    async fn missing_documents_load_empty() {
        let (gateway, _) = gateway();
        assert!(gateway.load_timers().await.unwrap().is_empty());
        assert!(gateway.load_history().await.unwrap().is_empty());
    }
}
