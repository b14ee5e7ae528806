//! Timer Board - countdown timers grouped by category
//!
//! This library provides the timer state machine, the tick scheduler that
//! drives it, exactly-once completion recording into a durable history log,
//! and the persistence gateway that keeps timers across restarts.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{ExportError, PersistenceError, ValidationError};
pub use services::{KeyValueStore, PersistenceGateway};
pub use state::{BulkOperation, Timer, TimerId, TimerStatus, TimerStore};
pub use tasks::{Scheduler, Tick};
pub use utils::signals::shutdown_signal;
