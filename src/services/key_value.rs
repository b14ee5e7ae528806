//! Opaque durable key-value store contract

use async_trait::async_trait;

use crate::error::PersistenceError;

/// Durable byte storage addressed by string keys.
///
/// `save` always replaces the whole value; there are no partial writes.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` when nothing was ever saved
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    async fn save(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError>;
}
