//! In-process key-value store with failure injection

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex, PoisonError,
    },
};

use async_trait::async_trait;
use tracing::debug;

use super::key_value::KeyValueStore;
use crate::error::PersistenceError;

/// Volatile store backed by a map, used by tests and ephemeral hosts
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following load fail until switched off
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make every following save fail until switched off
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Raw value currently stored under `key`
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Seed a raw value, bypassing failure injection
    pub fn insert(&self, key: &str, value: impl Into<Vec<u8>>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.into());
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(format!(
                "injected load failure for {}",
                key
            )));
        }
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(format!(
                "injected save failure for {}",
                key
            )));
        }
        debug!("Saving {} bytes under {}", value.len(), key);
        self.insert(key, value);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_loads_as_none() {
        let store = MemoryStore::new();
        assert_eq!(store.load("timers").await.unwrap(), None);
    }

    #[tokio::test]
    async fn injected_failures_leave_data_alone() {
        let store = MemoryStore::new();
        store.save("timers", b"[]").await.unwrap();

        store.set_fail_saves(true);
        assert!(store.save("timers", b"[1]").await.is_err());
        assert_eq!(store.get("timers"), Some(b"[]".to_vec()));
        assert_eq!(store.save_count(), 1);

        store.set_fail_loads(true);
        assert!(store.load("timers").await.is_err());
    }
}
