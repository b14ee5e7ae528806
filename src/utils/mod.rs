//! Utility functions module
//!
//! Clock abstraction and signal handling used throughout the application.

pub mod clock;
pub mod signals;

// Re-export main items
pub use clock::{Clock, FixedClock, SystemClock};
pub use signals::shutdown_signal;
