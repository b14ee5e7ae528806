//! Console API module
//!
//! The host's line-oriented front end: command parsing, handlers that drive
//! the store, and text rendering of their results.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{parse_command, Command, CommandError};
pub use handlers::{Console, Reply};
