//! External storage and export services
//!
//! The core only talks to durable storage through [`PersistenceGateway`],
//! which sits on top of an opaque [`KeyValueStore`] backend.

pub mod export;
pub mod file_store;
pub mod gateway;
pub mod key_value;
pub mod memory_store;

// Re-export main types
pub use export::{ExportSink, StdoutSink, EXPORT_TITLE};
pub use file_store::FileStore;
pub use gateway::{PersistenceGateway, HISTORY_KEY, TIMERS_KEY};
pub use key_value::KeyValueStore;
pub use memory_store::MemoryStore;
