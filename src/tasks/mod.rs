//! Background tasks module
//!
//! The tick scheduler and the writers that persist store changes run as
//! tokio tasks alongside the host.

pub mod persistence;
pub mod scheduler;

// Re-export main types
pub use persistence::{restore_history, restore_timers, spawn_persistence, PersistenceHandle};
pub use scheduler::{Scheduler, Tick};
